//! 内置加载器：SQLite `financial_signals` 表、JSON/CSV 文件、控制台。

pub mod config;
pub mod console;
pub mod file;
pub mod sqlite;

use sigflow_core::load::port::Loader;
use sigflow_core::plugin::error::PluginError;
use sigflow_core::plugin::port::{LoaderInit, PluginFactory, PluginKind};

use crate::console::ConsoleLoader;
use crate::file::FileLoader;
use crate::sqlite::SqliteLoader;

/// 本 crate 注册的模块路径
pub const MODULE: &str = "sigflow_store";

/// # Summary
/// 内置加载器种类。
///
/// # Invariants
/// - `Sqlite` 只接受 `params` 约定，`File` 只接受 `config` 约定，`Console` 两者皆可。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    Sqlite,
    File,
    Console,
}

impl LoaderKind {
    pub const ALL: [LoaderKind; 3] = [LoaderKind::Sqlite, LoaderKind::File, LoaderKind::Console];

    pub fn name(&self) -> &'static str {
        match self {
            LoaderKind::Sqlite => "sqlite_loader",
            LoaderKind::File => "file_loader",
            LoaderKind::Console => "console_loader",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            LoaderKind::Sqlite => "SqliteLoader",
            LoaderKind::File => "FileLoader",
            LoaderKind::Console => "ConsoleLoader",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.class() == class)
    }

    /// # Summary
    /// 按构造约定构造加载器。
    ///
    /// # Returns
    /// 约定不被接受时返回 `PluginError::SignatureMismatch`。
    pub fn build(&self, init: &LoaderInit) -> Result<Box<dyn Loader>, PluginError> {
        Ok(match self {
            LoaderKind::Sqlite => Box::new(SqliteLoader::from_params(init.expect_params()?)?),
            LoaderKind::File => Box::new(FileLoader::from_config(init.expect_config()?)?),
            LoaderKind::Console => Box::new(ConsoleLoader),
        })
    }
}

/// # Summary
/// `sigflow_store` 模块工厂。
#[derive(Debug, Default, Clone, Copy)]
pub struct StoreModule;

impl PluginFactory for StoreModule {
    fn module(&self) -> &str {
        MODULE
    }

    fn loader(&self, class: &str, init: &LoaderInit) -> Result<Box<dyn Loader>, PluginError> {
        LoaderKind::from_class(class)
            .ok_or_else(|| self.unknown_class(PluginKind::Loader, class))?
            .build(init)
    }
}
