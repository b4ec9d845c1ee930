// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求解析模块
//!
//! 该模块只关心原始请求的第一行。解析器是一个逐字节推进的小型状态机，
//! 依次校验方法、目标路径和协议版本三个记号，最终给出带标签的结果：
//! 1. `Retrieve`：合法的 `GET /<path> HTTP/1...` 请求行，附带目标路径。
//! 2. `Unsupported`：方法记号不是 `GET`（区分大小写）。
//! 3. `Malformed`：其余一切无法识别的输入。
//!
//! 请求头与请求体会被完全忽略。解析器永远不会查看第 `MAX_REQUEST_SIZE` 个字节之后的内容。

use std::{borrow::Cow, fmt};

use crate::param::*;
use log::debug;

/// 从请求行中提取出的目标路径（包含开头的 `/`）。
///
/// 长度上限为 `MAX_TARGET_LEN` 字节，超出部分被截断并通过 `is_truncated` 报告。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    bytes: Vec<u8>,
    truncated: bool,
}

impl Target {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 原始路径是否超过了 `MAX_TARGET_LEN`
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// 以文本形式查看目标路径，非 UTF-8 字节会被替换。仅用于日志。
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

/// 请求行的解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestLine {
    /// 合法的获取请求
    Retrieve(Target),
    /// 方法记号合法但不受支持
    Unsupported(HttpRequestMethod),
    /// 请求行格式不正确（包括空请求）
    Malformed,
}

/// 一次接收得到的请求。
///
/// 每个连接都重新构建，不会残留上一次请求的任何内容。
#[derive(Debug, Clone)]
pub struct Request {
    line: RequestLine,
    len: usize,
    at_capacity: bool,
}

/// 状态机的各个阶段
#[derive(Clone, Copy)]
enum State {
    Method,
    Slash,
    Path,
    Version(usize),
}

impl Request {
    /// 解析从连接中读到的原始字节。
    ///
    /// # 参数
    /// * `buffer` - 单次 receive 得到的数据，超过 `MAX_REQUEST_SIZE` 的部分不会被查看。
    /// * `id` - 连接 ID，用于日志追踪。
    pub fn parse(buffer: &[u8], id: u64) -> Self {
        let len = buffer.len().min(MAX_REQUEST_SIZE);
        let line = parse_request_line(&buffer[..len]);
        match &line {
            RequestLine::Retrieve(target) => debug!("[ID{}]识别为GET请求，目标：{}", id, target),
            RequestLine::Unsupported(method) => debug!("[ID{}]不支持的HTTP请求方法：{}", id, method),
            RequestLine::Malformed => debug!("[ID{}]HTTP请求行格式不正确", id),
        }
        Self {
            line,
            len,
            at_capacity: len == MAX_REQUEST_SIZE,
        }
    }

    pub fn line(&self) -> &RequestLine {
        &self.line
    }

    /// 获取目标路径。只有合法的获取请求才有目标。
    pub fn target(&self) -> Option<&Target> {
        match &self.line {
            RequestLine::Retrieve(target) => Some(target),
            _ => None,
        }
    }

    /// 获取请求方法。格式不正确的请求没有方法。
    pub fn method(&self) -> Option<HttpRequestMethod> {
        match &self.line {
            RequestLine::Retrieve(_) => Some(HttpRequestMethod::Get),
            RequestLine::Unsupported(method) => Some(method.clone()),
            RequestLine::Malformed => None,
        }
    }

    /// 实际参与解析的字节数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 请求是否填满了接收缓冲区，此时之后的字节已被丢弃
    pub fn at_capacity(&self) -> bool {
        self.at_capacity
    }
}

fn parse_request_line(buffer: &[u8]) -> RequestLine {
    let mut state = State::Method;
    let mut target = Vec::with_capacity(MAX_TARGET_LEN);
    let mut truncated = false;

    for (i, &byte) in buffer.iter().enumerate() {
        state = match state {
            State::Method => match byte {
                b' ' => {
                    let method = &buffer[..i];
                    if method == RETRIEVAL_METHOD {
                        State::Slash
                    } else if !method.is_empty() && method.iter().all(u8::is_ascii_alphabetic) {
                        let name = String::from_utf8_lossy(method).into_owned();
                        return RequestLine::Unsupported(HttpRequestMethod::Other(name));
                    } else {
                        return RequestLine::Malformed;
                    }
                }
                b'\r' | b'\n' => return RequestLine::Malformed,
                _ => State::Method,
            },
            State::Slash => match byte {
                b'/' => {
                    target.push(byte);
                    State::Path
                }
                _ => return RequestLine::Malformed,
            },
            State::Path => match byte {
                b' ' => State::Version(0),
                b'\r' | b'\n' => return RequestLine::Malformed,
                _ => {
                    if target.len() < MAX_TARGET_LEN {
                        target.push(byte);
                    } else {
                        truncated = true;
                    }
                    State::Path
                }
            },
            State::Version(matched) => {
                if byte != VERSION_PREFIX[matched] {
                    return RequestLine::Malformed;
                }
                if matched + 1 == VERSION_PREFIX.len() {
                    return RequestLine::Retrieve(Target {
                        bytes: target,
                        truncated,
                    });
                }
                State::Version(matched + 1)
            }
        };
    }

    // 输入在请求行完整之前就结束了
    RequestLine::Malformed
}
