use serde_json::Value;
use sigflow_core::common::time::TimeProvider;
use sigflow_core::metric::entity::{NormalizedMetric, RawRecord};
use sigflow_core::transform::error::TransformError;
use sigflow_core::transform::port::Transformer;
use std::sync::Arc;
use tracing::debug;

use crate::value::{as_number, require, unix_date};

/// # Summary
/// CoinGecko `simple/price` 响应中的单字段转换器。
///
/// # Logic
/// 1. 若记录外层以 `coin_id` 为键，先拆开该层。
/// 2. 读取目标字段为数值。
/// 3. 日期取 `last_updated_at`，缺失时取今天。
///
/// # Invariants
/// - 元数据 `source` 固定为 `coingecko`。
pub struct CoinFieldTransformer {
    coin_id: String,
    field: &'static str,
    units: &'static str,
    clock: Arc<dyn TimeProvider>,
}

impl CoinFieldTransformer {
    pub fn new(
        coin_id: impl Into<String>,
        field: &'static str,
        units: &'static str,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            coin_id: coin_id.into(),
            field,
            units,
            clock,
        }
    }

    pub fn price(coin_id: impl Into<String>, clock: Arc<dyn TimeProvider>) -> Self {
        Self::new(coin_id, "usd", "USD", clock)
    }

    pub fn market_cap(coin_id: impl Into<String>, clock: Arc<dyn TimeProvider>) -> Self {
        Self::new(coin_id, "usd_market_cap", "USD", clock)
    }

    pub fn change_24h(coin_id: impl Into<String>, clock: Arc<dyn TimeProvider>) -> Self {
        Self::new(coin_id, "usd_24h_change", "percentage", clock)
    }

    pub fn volume_24h(coin_id: impl Into<String>, clock: Arc<dyn TimeProvider>) -> Self {
        Self::new(coin_id, "usd_24h_vol", "USD", clock)
    }
}

impl Transformer for CoinFieldTransformer {
    fn transform(&self, raw: &RawRecord) -> Result<NormalizedMetric, TransformError> {
        let body: &Value = match raw.get(&self.coin_id) {
            Some(inner) if inner.is_object() => inner,
            _ => raw,
        };

        let value = as_number(require(body, self.field)?, self.field)?;
        let date = body
            .get("last_updated_at")
            .and_then(unix_date)
            .unwrap_or_else(|| self.clock.today());
        debug!(field = self.field, value, %date, "CoinGecko field transformed");

        Ok(NormalizedMetric::new(value, date, self.units).with_meta("source", "coingecko"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;
    use sigflow_core::common::time::FakeClockProvider;

    fn clock() -> Arc<dyn TimeProvider> {
        Arc::new(FakeClockProvider::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_price_unwraps_envelope_and_uses_today() {
        let t = CoinFieldTransformer::price("bitcoin", clock());
        let m = t.transform(&json!({"bitcoin": {"usd": 65000}})).unwrap();
        assert_eq!(m.value, 65000.0);
        assert_eq!(m.units, "USD");
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn test_flat_record_and_source_timestamp() {
        let t = CoinFieldTransformer::change_24h("bitcoin", clock());
        let m = t
            .transform(&json!({"usd_24h_change": -2.5, "last_updated_at": 1_714_521_600}))
            .unwrap();
        assert_eq!(m.value, -2.5);
        assert_eq!(m.units, "percentage");
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_missing_field() {
        let t = CoinFieldTransformer::volume_24h("bitcoin", clock());
        let err = t.transform(&json!({"bitcoin": {"usd": 1}})).unwrap_err();
        assert!(matches!(err, TransformError::MissingField(f) if f == "usd_24h_vol"));
    }
}
