// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应构建模块
//!
//! 响应只有两种形态：
//! - **200**：文件成功打开，读取至多 `MAX_BODY_SIZE` 字节作为响应体。更大的文件被截断，
//!   `Content-Length` 等于实际读取的字节数。
//! - **404**：文件无法打开或读取（包括路由未命中），`Content-Type: text/html`，
//!   `Content-Length: 0`，没有响应体。
//!
//! 响应头总是按其实际长度序列化，不存在固定大小的头部缓冲区。

use std::path::Path;

use bytes::Bytes;
use log::{debug, warn};
use tokio::{fs::File, io::AsyncReadExt};

use crate::{param::*, router::Resolution};

#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    information: &'static str,
    content_type: Option<&'static str>,
    content_length: usize,
    content: Bytes,
    truncated: bool,
}

impl Response {
    fn new(status_code: u16) -> Self {
        Self {
            status_code,
            information: STATUS_CODES.get(&status_code).copied().unwrap_or_default(),
            content_type: None,
            content_length: 0,
            content: Bytes::new(),
            truncated: false,
        }
    }

    /// 未找到响应：只有响应头，没有响应体
    pub fn response_404() -> Self {
        let mut response = Self::new(404);
        response.content_type = MIME_TYPES.get("html").copied();
        response
    }

    /// 根据路由结果构建响应
    pub async fn from_resolution(resolution: &Resolution, id: u64) -> Self {
        match resolution {
            Resolution::Found(path) => Self::from_file(path, id).await,
            Resolution::NotFound => Self::response_404(),
        }
    }

    /// 读取文件并构建 200 响应。文件无法打开或读取时退化为 404。
    pub async fn from_file(path: &Path, id: u64) -> Self {
        let file = match File::open(path).await {
            Ok(f) => f,
            Err(e) => {
                warn!("[ID{}]无法打开文件{}：{}，返回404", id, path.display(), e);
                return Self::response_404();
            }
        };

        // 多读一个字节，用来判断文件是否超出上限
        let mut contents = Vec::with_capacity(MAX_BODY_SIZE + 1);
        if let Err(e) = file
            .take(MAX_BODY_SIZE as u64 + 1)
            .read_to_end(&mut contents)
            .await
        {
            warn!("[ID{}]无法读取文件{}：{}，返回404", id, path.display(), e);
            return Self::response_404();
        }
        let truncated = contents.len() > MAX_BODY_SIZE;
        contents.truncate(MAX_BODY_SIZE);
        debug!(
            "[ID{}]读取文件{}完成，{} bytes，截断：{}",
            id,
            path.display(),
            contents.len(),
            truncated
        );

        let mut response = Self::new(200);
        response.content_type = get_mime(path);
        if response.content_type.is_none() {
            debug!("[ID{}]无法识别文件{}的类型，不发送Content-Type", id, path.display());
        }
        response.content_length = contents.len();
        response.content = Bytes::from(contents);
        response.truncated = truncated;
        response
    }

    /// 序列化响应头（状态行、可选的 `Content-Type`、`Content-Length` 与空行）
    pub fn header(&self) -> String {
        let mut header = format!(
            "{} {} {}{}",
            HTTP_VERSION, self.status_code, self.information, CRLF
        );
        if let Some(t) = self.content_type {
            header.push_str(&["Content-Type: ", t, CRLF].concat());
        }
        header.push_str(&format!("Content-Length: {}{}", self.content_length, CRLF));
        header.push_str(CRLF);
        header
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// 源文件是否超过了 `MAX_BODY_SIZE`
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

fn get_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?;
    MIME_TYPES.get(extension).copied()
}
