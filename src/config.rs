// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::warn;
use std::fs;
use std::path::Path;

use crate::exception::Exception;
use crate::param::*;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    local: bool,
    #[serde(default = "default_backlog")]
    backlog: u32,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_max_connections")]
    max_connections: usize,
    #[serde(default = "default_index_file")]
    index_file: String,
    #[serde(default = "default_contact_file")]
    contact_file: String,
    #[serde(default = "default_stylesheet_file")]
    stylesheet_file: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_backlog() -> u32 {
    DEFAULT_BACKLOG
}

fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

fn default_index_file() -> String {
    DEFAULT_INDEX_FILE.to_string()
}

fn default_contact_file() -> String {
    DEFAULT_CONTACT_FILE.to_string()
}

fn default_stylesheet_file() -> String {
    DEFAULT_STYLESHEET_FILE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: default_port(),
            local: false,
            backlog: default_backlog(),
            worker_threads: num_cpus::get(),
            max_connections: default_max_connections(),
            index_file: default_index_file(),
            contact_file: default_contact_file(),
            stylesheet_file: default_stylesheet_file(),
        }
    }

    /// 读取并解析 TOML 配置文件。文件缺失或内容非法都会返回错误。
    pub fn from_toml(filename: &str) -> Result<Self, Exception> {
        let str_val = fs::read_to_string(filename)
            .map_err(|e| Exception::ConfigNotFound(filename.to_string(), e))?;
        Self::from_toml_str(&str_val)
    }

    /// 从默认位置加载配置；默认文件不存在时使用内置默认值。
    ///
    /// 通过命令行显式指定的文件必须存在。
    pub fn load(filename: Option<&str>) -> Result<Self, Exception> {
        match filename {
            Some(f) => Self::from_toml(f),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_toml(DEFAULT_CONFIG_FILE),
            None => {
                warn!("找不到配置文件{}，使用默认配置", DEFAULT_CONFIG_FILE);
                Ok(Self::new())
            }
        }
    }

    pub fn from_toml_str(str_val: &str) -> Result<Self, Exception> {
        let mut raw_config: Config =
            toml::from_str(str_val).map_err(|e| Exception::ConfigInvalid(e.to_string()))?;
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.backlog == 0 {
            warn!("backlog被设置为0，该值将被改为{}。", DEFAULT_BACKLOG);
            raw_config.backlog = DEFAULT_BACKLOG;
        }
        if raw_config.max_connections == 0 {
            warn!(
                "max_connections被设置为0，服务器将无法接受任何连接，因此该值将被改为{}。",
                DEFAULT_MAX_CONNECTIONS
            );
            raw_config.max_connections = DEFAULT_MAX_CONNECTIONS;
        }
        Ok(raw_config)
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn index_file(&self) -> &str {
        &self.index_file
    }

    pub fn contact_file(&self) -> &str {
        &self.contact_file
    }

    pub fn stylesheet_file(&self) -> &str {
        &self.stylesheet_file
    }
}
