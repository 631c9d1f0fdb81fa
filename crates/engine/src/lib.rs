//! ETL 核心：插件解析、抽取缓存与编排引擎。

pub mod cache;
pub mod canonical;
pub mod config;
pub mod pipeline;
pub mod registry;
pub mod secrets;
