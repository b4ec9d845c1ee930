// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块集中定义了服务器遵循的协议常量与固定上限：
//! - 请求、目标路径、文件内容三处缓冲区的字节上限。这些上限是对外契约，
//!   超出部分会被截断，而不是报错或分多次读写。
//! - 仅有的两个状态码及其原因短语。
//! - 按扩展名判定的 MIME 类型表。

use std::collections::HashMap;
use lazy_static::lazy_static;

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 单次接收请求的最大字节数。超出部分永远不会被读取。
pub const MAX_REQUEST_SIZE: usize = 2000;

/// 目标路径（含开头的 `/`）的最大字节数。
pub const MAX_TARGET_LEN: usize = 100;

/// 响应体的最大字节数。更大的文件只发送前 `MAX_BODY_SIZE` 个字节。
pub const MAX_BODY_SIZE: usize = 2000;

/// 唯一支持的请求方法（区分大小写）
pub const RETRIEVAL_METHOD: &[u8] = b"GET";

/// 请求行版本字段必须具备的前缀
pub const VERSION_PREFIX: &[u8] = b"HTTP/1";

/// 响应状态行使用的协议版本
pub const HTTP_VERSION: &str = "HTTP/1.1";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKLOG: u32 = 16;
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

pub const DEFAULT_INDEX_FILE: &str = r"static/index.html";
pub const DEFAULT_CONTACT_FILE: &str = r"static/contact.html";
pub const DEFAULT_STYLESHEET_FILE: &str = r"static/styles.css";

/// 未指定配置文件路径时使用的默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = r"config/development.toml";

/// log4rs 的 YAML 配置文件
pub const LOG_CONFIG_FILE: &str = r"config/log4rs.yaml";

lazy_static! {
    /// 状态码与原因短语的映射表。
    ///
    /// 404 的原因短语保持小写 `not found`，这是线上报文格式的一部分。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(404, "not found");
        map
    };
}

lazy_static! {
    /// 文件后缀名到 MIME 类型的映射表。
    ///
    /// 不在表中的后缀不产生 `Content-Type` 头。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("html", "text/html");
        map.insert("css", "text/css");
        map
    };
}

/// 请求行中的 HTTP 方法。
///
/// 只有 `Get` 会被路由，其余方法一律按未找到处理。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 其他任何方法记号，保留原始文本用于日志
    Other(String),
}

use std::fmt;

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Other(m) => write!(f, "{}", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_phrases() {
        assert_eq!(STATUS_CODES.get(&200), Some(&"OK"));
        assert_eq!(STATUS_CODES.get(&404), Some(&"not found"));
        assert_eq!(STATUS_CODES.len(), 2);
    }

    #[test]
    fn test_mime_table() {
        assert_eq!(MIME_TYPES.get("html"), Some(&"text/html"));
        assert_eq!(MIME_TYPES.get("css"), Some(&"text/css"));
        assert!(MIME_TYPES.get("js").is_none());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpRequestMethod::Get.to_string(), "GET");
        assert_eq!(HttpRequestMethod::Other("POST".to_string()).to_string(), "POST");
    }
}
