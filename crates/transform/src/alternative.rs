use sigflow_core::common::time::TimeProvider;
use sigflow_core::metric::entity::{NormalizedMetric, RawRecord};
use sigflow_core::transform::error::TransformError;
use sigflow_core::transform::port::Transformer;
use std::sync::Arc;

use crate::value::{as_number, require, unix_date};

/// # Summary
/// 恐惧贪婪指数转换器：取 `data` 列表第一项。
///
/// # Invariants
/// - 单位为 `index`，分级文字写入元数据 `classification`。
pub struct FearGreedTransformer {
    clock: Arc<dyn TimeProvider>,
}

impl FearGreedTransformer {
    pub fn new(clock: Arc<dyn TimeProvider>) -> Self {
        Self { clock }
    }
}

impl Transformer for FearGreedTransformer {
    fn transform(&self, raw: &RawRecord) -> Result<NormalizedMetric, TransformError> {
        let latest = require(raw, "data")?
            .as_array()
            .and_then(|list| list.first())
            .ok_or_else(|| TransformError::NoData("empty fear & greed data list".into()))?;

        let value = as_number(require(latest, "value")?, "value")?;
        let classification = require(latest, "value_classification")?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let date = latest
            .get("timestamp")
            .and_then(unix_date)
            .unwrap_or_else(|| self.clock.today());

        Ok(NormalizedMetric::new(value, date, "index")
            .with_meta("classification", classification)
            .with_meta("source", "alternative.me"))
    }
}

/// # Summary
/// 全市场总市值转换器：读取 `data.quotes.USD.total_market_cap`。
pub struct TotalMarketCapTransformer {
    clock: Arc<dyn TimeProvider>,
}

impl TotalMarketCapTransformer {
    pub fn new(clock: Arc<dyn TimeProvider>) -> Self {
        Self { clock }
    }
}

impl Transformer for TotalMarketCapTransformer {
    fn transform(&self, raw: &RawRecord) -> Result<NormalizedMetric, TransformError> {
        let data = require(raw, "data")?;
        let cap = data
            .pointer("/quotes/USD/total_market_cap")
            .filter(|v| !v.is_null())
            .ok_or_else(|| TransformError::MissingField("data.quotes.USD.total_market_cap".into()))?;
        let value = as_number(cap, "total_market_cap")?;

        let mut metric = NormalizedMetric::new(value, self.clock.today(), "USD")
            .with_meta("source", "alternative.me");
        if let Some(ts) = data.get("last_updated").and_then(|v| v.as_i64()) {
            metric = metric.with_meta("last_updated_at_source", ts);
        }
        Ok(metric)
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
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_fear_greed() {
        let raw = json!({"data": [
            {"value": "72", "value_classification": "Greed", "timestamp": "1714521600"}
        ]});
        let m = FearGreedTransformer::new(clock()).transform(&raw).unwrap();
        assert_eq!(m.value, 72.0);
        assert_eq!(m.units, "index");
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(m.metadata["classification"], json!("Greed"));
    }

    #[test]
    fn test_fear_greed_empty_list() {
        let r = FearGreedTransformer::new(clock()).transform(&json!({"data": []}));
        assert!(matches!(r, Err(TransformError::NoData(_))));
    }

    #[test]
    fn test_total_market_cap() {
        let raw = json!({"data": {
            "quotes": {"USD": {"total_market_cap": 2.4e12}},
            "last_updated": 1_718_409_600
        }});
        let m = TotalMarketCapTransformer::new(clock()).transform(&raw).unwrap();
        assert_eq!(m.value, 2.4e12);
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(m.metadata["last_updated_at_source"], json!(1_718_409_600));

        let r = TotalMarketCapTransformer::new(clock()).transform(&json!({"data": {"quotes": {}}}));
        assert!(matches!(r, Err(TransformError::MissingField(_))));
    }
}
