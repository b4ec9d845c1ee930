// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在启动、监听与处理连接过程中可能出现的错误。
//!
//! ## 错误分类
//! - **启动错误**：配置、日志、运行时、绑定与监听失败，均为进程级致命错误。
//! - **Accept 错误**：同样为致命错误，监听循环会立即停止。
//! - **连接内错误**：接收或发送失败，只影响当前连接。
//!
//! 请求无法解析、路由未命中、文件缺失都不属于错误，它们会被转换为 404 响应。

use std::{fmt, io};

/// 服务器运行过程中发生的异常类型。
#[derive(Debug)]
pub enum Exception {
    /// 显式指定的配置文件不存在或无法读取
    ConfigNotFound(String, io::Error),
    /// 配置文件内容不是合法的 TOML，或字段类型不匹配
    ConfigInvalid(String),
    /// 无法初始化 log4rs
    Logging(String),
    /// 无法创建 Tokio 运行时
    Runtime(io::Error),
    /// 无法将地址与端口绑定到 Socket
    Bind(io::Error),
    /// Socket 无法进入监听状态
    Listen(io::Error),
    /// 监听循环中 accept 失败。该错误会终止整个监听器。
    Accept(io::Error),
    /// 无法安装终止信号处理器
    Signal(io::Error),
    /// 从连接中读取请求失败
    Receive(io::Error),
    /// 向连接写入响应失败
    Send(io::Error),
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigNotFound(path, e) => write!(f, "Couldn't read config file {}: {}", path, e),
            ConfigInvalid(msg) => write!(f, "Invalid config: {}", msg),
            Logging(msg) => write!(f, "Couldn't initialize logger: {}", msg),
            Runtime(e) => write!(f, "Couldn't build async runtime: {}", e),
            Bind(e) => write!(f, "Error binding address and port to socket: {}", e),
            Listen(e) => write!(f, "Error listening for connections: {}", e),
            Accept(e) => write!(f, "Error accepting connection: {}", e),
            Signal(e) => write!(f, "Couldn't install signal handler: {}", e),
            Receive(e) => write!(f, "Error receiving request: {}", e),
            Send(e) => write!(f, "Error sending response: {}", e),
        }
    }
}

impl std::error::Error for Exception {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigNotFound(_, e) | Runtime(e) | Bind(e) | Listen(e) | Accept(e) | Signal(e)
            | Receive(e) | Send(e) => Some(e),
            ConfigInvalid(_) | Logging(_) => None,
        }
    }
}
