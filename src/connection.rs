// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接处理器
//!
//! 负责单个 TCP 连接的完整生命周期：接收、解析、路由、响应、关闭。
//! 每一步只执行一次，没有重试：
//! - 只调用一次 read，短读直接被当作完整请求。
//! - 响应头与响应体各写一次，短写同样被视为最终结果。
//! - 无论走了哪条路径，连接都会在最后被双向关闭，且只关闭一次。

use std::net::{Shutdown, SocketAddr};
use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use crate::{
    exception::Exception, param::MAX_REQUEST_SIZE, request::Request, response::Response,
    router::Router,
};

/// 处理一个已接受的连接，结束时关闭连接。
pub async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, id: u64, router: &Router) {
    debug!("[ID{}]TCP连接已建立：{}", id, peer);
    if let Err(e) = exchange(&mut stream, peer, id, router).await {
        error!("[ID{}]{}", id, e);
    }
    teardown(stream, id);
}

async fn exchange(
    stream: &mut TcpStream,
    peer: SocketAddr,
    id: u64,
    router: &Router,
) -> Result<(), Exception> {
    // 每个连接使用全新的缓冲区
    let mut buffer = vec![0u8; MAX_REQUEST_SIZE];
    let n = stream.read(&mut buffer).await.map_err(Exception::Receive)?;
    debug!("[ID{}]HTTP请求接收完毕，{} bytes", id, n);

    let start_time = Instant::now();

    let request = Request::parse(&buffer[..n], id);
    if request.at_capacity() {
        warn!(
            "[ID{}]请求达到{}字节上限，之后的内容不会被读取",
            id, MAX_REQUEST_SIZE
        );
    }
    if let Some(target) = request.target() {
        if target.is_truncated() {
            warn!("[ID{}]请求路径过长，已被截断为：{}", id, target);
        }
    }

    let resolution = router.resolve(request.target(), id);
    let response = Response::from_resolution(&resolution, id).await;
    if response.is_truncated() {
        warn!(
            "[ID{}]文件超过响应体上限，只发送前{}字节",
            id,
            response.content_length()
        );
    }

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    info!(
        "[ID{}] {}, {}, {}, {}, {}",
        id,
        peer,
        request
            .method()
            .map_or_else(|| "-".to_string(), |m| m.to_string()),
        request
            .target()
            .map_or_else(|| "-".to_string(), |t| t.to_string()),
        response.status_code(),
        response.content_length(),
    );

    let header = response.header();
    let sent = stream
        .write(header.as_bytes())
        .await
        .map_err(Exception::Send)?;
    if sent < header.len() {
        warn!(
            "[ID{}]响应头只发送了{}/{}字节，放弃发送响应体",
            id,
            sent,
            header.len()
        );
        return Ok(());
    }

    let body = response.content();
    if !body.is_empty() {
        let sent = stream.write(body).await.map_err(Exception::Send)?;
        if sent < body.len() {
            warn!("[ID{}]响应体只发送了{}/{}字节", id, sent, body.len());
        }
    }
    Ok(())
}

/// 双向关闭连接并释放
fn teardown(stream: TcpStream, id: u64) {
    match stream.into_std() {
        Ok(stream) => {
            // 对端先关闭时 shutdown 可能返回 NotConnected，这不影响释放
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!("[ID{}]关闭连接时出现错误：{}", id, e);
            }
        }
        Err(e) => debug!("[ID{}]无法取得底层Socket：{}", id, e),
    }
    debug!("[ID{}]连接已关闭", id);
}
