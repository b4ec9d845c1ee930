// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 监听器
//!
//! `Server` 独占监听 Socket，负责绑定、监听与接受连接，并把每个连接交给独立的异步任务处理。
//!
//! ## 并发上限
//! 并发处理的连接数由一个计数信号量限制（`max_connections`）。监听循环在调用 accept
//! **之前**先取得许可：许可耗尽时不再接受新连接，多出的客户端在内核 backlog 中排队，
//! 直到某个处理器结束并归还许可。
//!
//! ## 错误策略
//! 绑定、监听、accept 失败都是致命错误：记录日志、触发停机标志并返回错误，监听循环不会继续。
//! 监听循环通过 `Acceptor` 获取连接，测试中用总是失败的连接来源验证这一策略。

use std::{
    future::Future,
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use log::{debug, error, info};
use tokio::{
    net::{TcpListener, TcpSocket, TcpStream},
    sync::Semaphore,
};

use crate::{
    config::Config, connection::handle_connection, exception::Exception, router::Router,
    shutdown::ShutdownHandle,
};

/// 当前活跃连接数，供控制台查询。
#[derive(Debug, Clone)]
pub struct ActiveConnections {
    count: Arc<AtomicUsize>,
    capacity: usize,
}

impl ActiveConnections {
    /// 正在处理中的连接数
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    gate: Arc<Semaphore>,
    active: ActiveConnections,
    shutdown: ShutdownHandle,
}

impl Server {
    /// 绑定端口并开始监听。失败时返回错误，此时不会接受任何连接。
    pub async fn bind(config: &Config) -> Result<Self, Exception> {
        let address = match config.local() {
            true => Ipv4Addr::new(127, 0, 0, 1),
            false => Ipv4Addr::new(0, 0, 0, 0),
        };
        let socket_addr = SocketAddrV4::new(address, config.port());
        info!("服务端将在{}上监听Socket连接", socket_addr);

        let socket = TcpSocket::new_v4().map_err(Exception::Bind)?;
        socket.set_reuseaddr(true).map_err(Exception::Bind)?;
        if let Err(e) = socket.bind(SocketAddr::V4(socket_addr)) {
            error!("无法绑定端口：{}，错误：{}", config.port(), e);
            return Err(Exception::Bind(e));
        }
        let listener = match socket.listen(config.backlog()) {
            Ok(listener) => listener,
            Err(e) => {
                error!("无法在端口{}上监听，错误：{}", config.port(), e);
                return Err(Exception::Listen(e));
            }
        };
        info!(
            "端口{}绑定完成，backlog：{}，最大并发连接数：{}",
            config.port(),
            config.backlog(),
            config.max_connections()
        );

        Ok(Self {
            listener,
            router: Arc::new(Router::from_config(config)),
            gate: Arc::new(Semaphore::new(config.max_connections())),
            active: ActiveConnections {
                count: Arc::new(AtomicUsize::new(0)),
                capacity: config.max_connections(),
            },
            shutdown: ShutdownHandle::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 用于请求停机的句柄
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn active_connections(&self) -> ActiveConnections {
        self.active.clone()
    }

    /// 运行监听循环，直到收到停机请求（返回 `Ok`）或 accept 失败（返回 `Err`）。
    ///
    /// 返回时监听 Socket 已被关闭；仍在处理中的连接会独立完成，不会被等待。
    pub async fn run(self) -> Result<(), Exception> {
        let Server {
            listener,
            router,
            gate,
            active,
            shutdown,
        } = self;

        let result = accept_loop(&listener, router, gate, &active, &shutdown).await;

        info!("主循环已退出，正在关闭监听Socket...");
        drop(listener);
        info!("监听Socket已关闭，仍有{}个连接在处理中", active.count());
        result
    }
}

/// 连接来源。监听循环只依赖这一个操作。
trait Acceptor {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl Acceptor for TcpListener {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }
}

async fn accept_loop<A: Acceptor>(
    acceptor: &A,
    router: Arc<Router>,
    gate: Arc<Semaphore>,
    active: &ActiveConnections,
    shutdown: &ShutdownHandle,
) -> Result<(), Exception> {
    let mut id: u64 = 0;

    loop {
        // 1. 先取得许可，许可耗尽时新连接留在 backlog 中
        let permit = tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            permit = Arc::clone(&gate).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        // 2. 等待新的 TCP 连接；accept 失败时停止整个监听器，不再重试
        let (stream, peer) = tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            accepted = acceptor.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Accept失败：{}，监听器将停止", e);
                    shutdown.trigger();
                    return Err(Exception::Accept(e));
                }
            },
        };
        id += 1;
        debug!("[ID{}]新的连接：{}", id, peer);

        // 3. 每个连接一个独立任务，许可随任务结束而归还
        let router = Arc::clone(&router);
        let count = Arc::clone(&active.count);
        count.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            handle_connection(stream, peer, id, &router).await;
            count.fetch_sub(1, Ordering::SeqCst);
            drop(permit);
        });
    }

    info!("主循环接收到停机指令");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// 每次 accept 都失败的连接来源，并记录被调用的次数
    struct FailingAcceptor {
        calls: AtomicUsize,
    }

    impl Acceptor for FailingAcceptor {
        fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async { Err(io::Error::new(io::ErrorKind::Other, "too many open files")) }
        }
    }

    fn parts(capacity: usize) -> (Arc<Router>, Arc<Semaphore>, ActiveConnections, ShutdownHandle) {
        (
            Arc::new(Router::new("index.html", "contact.html", "styles.css")),
            Arc::new(Semaphore::new(capacity)),
            ActiveConnections {
                count: Arc::new(AtomicUsize::new(0)),
                capacity,
            },
            ShutdownHandle::new(),
        )
    }

    /// accept 失败是致命的：循环立即返回错误并触发停机，不会再次 accept
    #[tokio::test]
    async fn test_accept_failure_stops_listener() {
        let acceptor = FailingAcceptor {
            calls: AtomicUsize::new(0),
        };
        let (router, gate, active, shutdown) = parts(4);

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            accept_loop(&acceptor, router, Arc::clone(&gate), &active, &shutdown),
        )
        .await
        .unwrap();

        match result {
            Err(Exception::Accept(e)) => assert_eq!(e.to_string(), "too many open files"),
            other => panic!("Expected Accept error, got {:?}", other),
        }
        assert_eq!(acceptor.calls.load(Ordering::SeqCst), 1);
        assert!(shutdown.is_triggered());
        assert_eq!(active.count(), 0);
        // 失败那一轮取得的许可已经归还
        assert_eq!(gate.available_permits(), 4);
    }

    /// 已经请求停机时，循环不会调用 accept
    #[tokio::test]
    async fn test_triggered_shutdown_skips_accept() {
        let acceptor = FailingAcceptor {
            calls: AtomicUsize::new(0),
        };
        let (router, gate, active, shutdown) = parts(1);
        shutdown.trigger();

        let result = accept_loop(&acceptor, router, gate, &active, &shutdown).await;
        assert!(result.is_ok());
        assert_eq!(acceptor.calls.load(Ordering::SeqCst), 0);
    }
}
