// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 向测试进程自身发送 SIGTERM，验证信号只触发停机而不会直接终止进程。
//!
//! 信号作用于整个进程，因此这个文件只包含一个测试。

#![cfg(unix)]

use std::{process::Command, time::Duration};

use miniweb::{shutdown, Config, Server};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    signal::unix::{signal, SignalKind},
    time::timeout,
};

const INDEX: &[u8] = b"<h1>index</h1>";

fn send_sigterm_to_self() {
    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn test_sigterm_stops_accepting() {
    // 先注册 SIGTERM，之后默认的终止动作就不会再生效
    let _terminate = signal(SignalKind::terminate()).unwrap();

    let dir = TempDir::new().unwrap();
    for (name, contents) in [
        ("index.html", INDEX),
        ("contact.html", b"contact".as_slice()),
        ("styles.css", b"body{}".as_slice()),
    ] {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    let toml = format!(
        "port = 0\nlocal = true\nindex_file = {:?}\ncontact_file = {:?}\nstylesheet_file = {:?}\n",
        dir.path().join("index.html").to_str().unwrap(),
        dir.path().join("contact.html").to_str().unwrap(),
        dir.path().join("styles.css").to_str().unwrap(),
    );
    let server = Server::bind(&Config::from_toml_str(&toml).unwrap())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.shutdown_handle();
    let run = tokio::spawn(server.run());
    tokio::spawn(shutdown::watch_signals(handle.clone()));

    // 停机前服务器正常工作
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let mut response = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .unwrap()
        .unwrap();
    assert!(response.ends_with(INDEX));

    // watch_signals 在任务中安装自己的处理器，重复发送直到它观察到信号
    timeout(Duration::from_secs(5), async {
        while !handle.is_triggered() {
            send_sigterm_to_self();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .expect("SIGTERM未触发停机");

    let result = timeout(Duration::from_secs(5), run)
        .await
        .expect("监听循环未在停机后退出")
        .unwrap();
    assert!(result.is_ok());
    assert!(TcpStream::connect(addr).await.is_err());
}
