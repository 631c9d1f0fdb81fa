//! # sigflow-core
//!
//! 指标 ETL 管道的领域核心：实体、端口 (Trait) 与错误类型。
//! 不包含任何具体的抓取、转换或落库实现。

pub mod cache;
pub mod common;
pub mod config;
pub mod engine;
pub mod extract;
pub mod load;
pub mod metric;
pub mod plugin;
pub mod secrets;
pub mod transform;

#[cfg(feature = "test-utils")]
pub mod test_utils;
