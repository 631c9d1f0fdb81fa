use crate::load::error::LoadError;
use crate::metric::entity::NormalizedMetric;
use async_trait::async_trait;

/// # Summary
/// 指标加载能力接口 (Port)，把标准化指标写入某个目标 (数据库、文件、日志)。
///
/// # Invariants
/// - 实现类必须保证线程安全 (`Send` + `Sync`)。
#[async_trait]
pub trait Loader: Send + Sync {
    /// # Summary
    /// 写入一条指标。
    ///
    /// # Arguments
    /// * `metric`: 已注入 `signal_name` 的标准化指标。
    ///
    /// # Returns
    /// * `Ok(true)` - 目标已接收。
    /// * `Ok(false)` - 目标未接收，但没有可报告的错误；引擎按加载失败处理。
    /// * `Err(LoadError)` - 写入失败。
    async fn load(&self, metric: &NormalizedMetric) -> Result<bool, LoadError>;
}
