// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 管理控制台
//!
//! 在后台逐行读取指令：
//! - `stop`   请求停机
//! - `status` 查看活跃连接数
//! - `help`   显示帮助
//!
//! 输入流结束（EOF）时控制台退出，但服务器继续运行。

use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{server::ActiveConnections, shutdown::ShutdownHandle};

pub async fn run_console<R, W>(
    mut reader: R,
    mut writer: W,
    shutdown: ShutdownHandle,
    active: ActiveConnections,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut input = String::new();
    loop {
        input.clear();
        if reader.read_line(&mut input).await? == 0 {
            debug!("控制台输入已关闭");
            return Ok(());
        }
        let output = match input.trim() {
            "" => continue,
            "stop" => {
                info!("控制台发出停机指令");
                shutdown.trigger();
                writer
                    .write_all("停机指令已激活，监听器将停止接受新连接...\n".as_bytes())
                    .await?;
                writer.flush().await?;
                return Ok(());
            }
            "help" => [
                "== Webserver Help ==",
                "stop   - 发出停机信号",
                "status - 查看当前服务器运行状态",
                "help   - 显示此帮助信息",
                "====================",
            ]
            .join("\n"),
            "status" => format!(
                "== Webserver 状态 ===\n当前活跃连接数: {}/{}\n停机中: {}\n====================",
                active.count(),
                active.capacity(),
                shutdown.is_triggered()
            ),
            cmd => format!("无效的命令：{}", cmd),
        };
        writer.write_all(output.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
}
