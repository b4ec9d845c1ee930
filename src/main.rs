// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 最小化 Web 服务器
//!
//! 只提供三条固定路由（`/`、`/contact`、`/styles.css`）的 TCP 服务器。
//! 核心流程：
//! - 监听循环为每个连接启动一个独立的异步任务，并发数受 `max_connections` 限制
//! - 每个连接只处理一个请求，处理完毕立即关闭
//! - SIGINT/SIGTERM 或控制台 `stop` 指令触发协作式停机
//!
//! 正常停机时退出码为 0，启动失败或 accept 失败时退出码为 1。

use log::{error, info, warn, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::{io::BufReader, runtime::Builder};

use miniweb::{
    console::run_console, param::LOG_CONFIG_FILE, shutdown, Config, Exception, Server,
};

fn main() {
    let code = match run() {
        Ok(()) => 0,
        Err(e) => {
            if let Exception::Logging(_) = e {
                eprintln!("{}", e);
            }
            error!("服务器异常退出：{}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run() -> Result<(), Exception> {
    // 1. 初始化日志系统
    init_logging()?;

    // 2. 加载配置，第一个命令行参数可以指定配置文件
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;
    info!("配置文件已载入");

    // 3. 根据配置的工作线程数构建运行时
    let runtime = Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
        .map_err(Exception::Runtime)?;

    let result = runtime.block_on(serve(config));

    // 不等待仍在处理中的连接
    runtime.shutdown_background();
    result
}

async fn serve(config: Config) -> Result<(), Exception> {
    let server = Server::bind(&config).await?;
    let shutdown_handle = server.shutdown_handle();

    tokio::spawn(shutdown::watch_signals(shutdown_handle.clone()));

    let active = server.active_connections();
    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        if let Err(e) = run_console(reader, tokio::io::stdout(), shutdown_handle, active).await {
            warn!("控制台读取失败：{}", e);
        }
    });

    server.run().await?;
    info!("服务器已停止");
    Ok(())
}

/// 优先使用 YAML 配置文件，失败时退回到输出到控制台的默认配置
fn init_logging() -> Result<(), Exception> {
    let file_error = match log4rs::init_file(LOG_CONFIG_FILE, Default::default()) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {m}{n}",
        )))
        .build();
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .map_err(|e| Exception::Logging(e.to_string()))?;
    log4rs::init_config(log_config).map_err(|e| Exception::Logging(e.to_string()))?;

    warn!(
        "无法从{}加载日志配置：{}，使用默认控制台日志",
        LOG_CONFIG_FILE, file_error
    );
    Ok(())
}
