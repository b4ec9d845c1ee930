// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 停机控制模块
//!
//! 停机是协作式的：信号处理与控制台 `stop` 指令只负责翻转一个标志位，
//! 真正关闭监听 Socket 的是监听循环本身，它在普通任务上下文中观察到标志位后退出。
//! 正在处理中的连接不会被等待。

use std::sync::Arc;

use log::{error, info};
use tokio::sync::watch;

use crate::exception::Exception;

/// 停机标志位的句柄，可以被任意克隆并在多个任务间共享。
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// 请求停机。重复调用没有额外效果。
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// 等待停机请求。如果已经请求过停机则立即返回。
    pub async fn triggered(&self) {
        let mut receiver = self.sender.subscribe();
        // 发送端由 self 持有，wait_for 不会因通道关闭而返回错误
        let _ = receiver.wait_for(|flag| *flag).await;
    }
}

/// 等待 SIGINT 或 SIGTERM。
pub async fn wait_for_signal() -> Result<&'static str, Exception> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate()).map_err(Exception::Signal)?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT").map_err(Exception::Signal),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map(|_| "Ctrl-C")
            .map_err(Exception::Signal)
    }
}

/// 将终止信号转换为停机请求。信号处理器安装失败时只记录错误，服务器继续运行。
pub async fn watch_signals(handle: ShutdownHandle) {
    match wait_for_signal().await {
        Ok(name) => {
            info!("收到{}，正在停机...", name);
            handle.trigger();
        }
        Err(e) => error!("{}，服务器将无法响应终止信号", e),
    }
}
