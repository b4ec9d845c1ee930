// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由模块
//!
//! 路由表在编译期固定，只有三条记录。匹配使用字节级的完全相等，
//! 不做前缀匹配、不合并 `//`、不做百分号解码、不把结尾的 `/` 视为等价。
//! 只有文件的实际位置来自配置。

use std::path::{Path, PathBuf};

use log::debug;

use crate::{config::Config, request::Target};

/// 路由表中的逻辑资源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Contact,
    Stylesheet,
}

/// 固定路由表：目标路径 -> 资源
const ROUTES: [(&[u8], Route); 3] = [
    (b"/", Route::Index),
    (b"/contact", Route::Contact),
    (b"/styles.css", Route::Stylesheet),
];

/// 路由解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(PathBuf),
    /// 未找到哨兵值，永远不会对应到真实文件
    NotFound,
}

/// 在进程生命周期内不可变的路由器
#[derive(Debug, Clone)]
pub struct Router {
    index: PathBuf,
    contact: PathBuf,
    stylesheet: PathBuf,
}

impl Router {
    pub fn new(index: impl AsRef<Path>, contact: impl AsRef<Path>, stylesheet: impl AsRef<Path>) -> Self {
        Self {
            index: index.as_ref().to_path_buf(),
            contact: contact.as_ref().to_path_buf(),
            stylesheet: stylesheet.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.index_file(),
            config.contact_file(),
            config.stylesheet_file(),
        )
    }

    /// 在路由表中查找目标路径对应的资源
    pub fn lookup(target: &[u8]) -> Option<Route> {
        ROUTES
            .iter()
            .find(|(path, _)| *path == target)
            .map(|(_, route)| *route)
    }

    /// 将解析得到的目标映射到文件位置。没有目标或目标不在表中时返回 `NotFound`。
    pub fn resolve(&self, target: Option<&Target>, id: u64) -> Resolution {
        let route = match target.and_then(|t| Self::lookup(t.as_bytes())) {
            Some(route) => route,
            None => {
                debug!("[ID{}]路由未命中", id);
                return Resolution::NotFound;
            }
        };
        let path = match route {
            Route::Index => &self.index,
            Route::Contact => &self.contact,
            Route::Stylesheet => &self.stylesheet,
        };
        debug!("[ID{}]路由命中：{:?} -> {}", id, route, path.display());
        Resolution::Found(path.clone())
    }
}
