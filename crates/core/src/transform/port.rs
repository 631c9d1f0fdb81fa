use crate::metric::entity::{NormalizedMetric, RawRecord};
use crate::transform::error::TransformError;

/// # Summary
/// 数据转换能力接口 (Port)，把原始记录映射为标准化指标。
///
/// # Invariants
/// - 纯计算，不执行任何 I/O。
/// - 输出至少包含 value、date、units。`signal_name` 由引擎覆盖，转换器无需填写。
pub trait Transformer: Send + Sync {
    /// # Summary
    /// 执行转换。
    ///
    /// # Arguments
    /// * `raw`: 抽取器产出的原始记录。
    ///
    /// # Returns
    /// 成功返回 `NormalizedMetric`，失败返回 `TransformError`。
    fn transform(&self, raw: &RawRecord) -> Result<NormalizedMetric, TransformError>;
}
