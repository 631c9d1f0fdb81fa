use sigflow_core::common::time::TimeProvider;
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::metric::entity::{NormalizedMetric, RawRecord};
use sigflow_core::plugin::error::PluginError;
use sigflow_core::transform::error::TransformError;
use sigflow_core::transform::port::Transformer;
use std::sync::Arc;

use crate::value::{as_number, require};

/// # Summary
/// 从记录顶层按 `key` 取值的通用转换器，适用于同一响应派生多个信号的场景。
///
/// # Invariants
/// - 键名包含 `usd` (不区分大小写) 时单位为 `USD`，否则为空。
/// - 日期始终为今天。
pub struct KeyTransformer {
    key: String,
    clock: Arc<dyn TimeProvider>,
}

impl KeyTransformer {
    /// # Returns
    /// 缺少 `key` 参数返回 `PluginError::InvalidParams`。
    pub fn from_params(params: &Params, clock: Arc<dyn TimeProvider>) -> Result<Self, PluginError> {
        let key = params
            .get_str("key")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PluginError::InvalidParams("key_transformer requires `key`".into()))?;
        Ok(Self {
            key: key.to_string(),
            clock,
        })
    }
}

impl Transformer for KeyTransformer {
    fn transform(&self, raw: &RawRecord) -> Result<NormalizedMetric, TransformError> {
        let value = as_number(require(raw, &self.key)?, &self.key)?;
        let units = if self.key.to_lowercase().contains("usd") {
            "USD"
        } else {
            ""
        };
        Ok(NormalizedMetric::new(value, self.clock.today(), units))
    }
}
