use crate::engine::entity::Stage;
use crate::extract::error::ExtractError;
use crate::load::error::LoadError;
use crate::plugin::error::PluginError;
use crate::transform::error::TransformError;
use thiserror::Error;

/// # Summary
/// 信号处理过程中可能出现的全部错误类别。
///
/// # Invariants
/// - 永远不会越过单个信号的边界向外传播。
#[derive(Error, Debug)]
pub enum SignalError {
    // 插件无法解析或构造
    #[error("Plugin resolution error: {0}")]
    Plugin(#[from] PluginError),
    // 抽取器报告失败
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),
    // 转换器报告失败
    #[error("Transformation error: {0}")]
    Transform(#[from] TransformError),
    // 加载器报告失败
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
    // 插件内部 panic，在信号边界被捕获
    #[error("Unexpected panic: {0}")]
    Panic(String),
}

/// # Summary
/// 带阶段归属的信号错误。
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: SignalError,
}

impl StageError {
    pub fn new(stage: Stage, source: impl Into<SignalError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
