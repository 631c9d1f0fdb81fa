use chrono::DateTime;
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::metric::entity::{NormalizedMetric, RawRecord};
use sigflow_core::transform::error::TransformError;
use sigflow_core::transform::port::Transformer;

use crate::value::{as_number, require};

/// # Summary
/// 取 Yahoo K 线列表最后一根的收盘价。
///
/// # Invariants
/// - 日期取该 K 线的 `time` (RFC 3339)。
/// - 单位来自参数 `units`，默认 `USD`。
pub struct YahooCloseTransformer {
    units: String,
}

impl YahooCloseTransformer {
    pub fn from_params(params: &Params) -> Self {
        Self {
            units: params.str_or("units", "USD").to_string(),
        }
    }
}

impl Transformer for YahooCloseTransformer {
    fn transform(&self, raw: &RawRecord) -> Result<NormalizedMetric, TransformError> {
        let last = raw
            .as_array()
            .and_then(|candles| candles.last())
            .ok_or_else(|| TransformError::NoData("empty candle list".into()))?;

        let close = as_number(require(last, "close")?, "close")?;
        let time = require(last, "time")?;
        let date = time
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.date_naive())
            .ok_or_else(|| TransformError::InvalidValue {
                field: "time".into(),
                reason: format!("not an RFC 3339 timestamp: {}", time),
            })?;

        let mut metric = NormalizedMetric::new(close, date, self.units.clone());
        if let Some(adj) = last.get("adj_close").and_then(|v| v.as_f64()) {
            metric = metric.with_meta("adj_close", adj);
        }
        Ok(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_last_close() {
        let raw = json!([
            {"time": "2024-05-01T13:30:00Z", "close": 170.0, "adj_close": null},
            {"time": "2024-05-02T13:30:00Z", "close": 172.5, "adj_close": 172.1}
        ]);
        let m = YahooCloseTransformer::from_params(&Params::new())
            .transform(&raw)
            .unwrap();
        assert_eq!(m.value, 172.5);
        assert_eq!(m.units, "USD");
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(m.metadata["adj_close"], json!(172.1));
    }

    #[test]
    fn test_empty_list() {
        let r = YahooCloseTransformer::from_params(&Params::new()).transform(&json!([]));
        assert!(matches!(r, Err(TransformError::NoData(_))));
    }
}
