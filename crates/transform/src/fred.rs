use chrono::NaiveDate;
use sigflow_core::common::time::TimeProvider;
use sigflow_core::metric::entity::{NormalizedMetric, RawRecord};
use sigflow_core::transform::error::TransformError;
use sigflow_core::transform::port::Transformer;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::value::{as_number, require};

/// # Summary
/// FRED M2 观测值转换器。
///
/// # Logic
/// 1. 遍历 `observations`，跳过日期非法、日期晚于今天、数值为 `.` 或非数值的条目。
/// 2. 取剩余条目中日期最新的一条。
///
/// # Invariants
/// - 单位固定为 `USD`。
pub struct M2Transformer {
    clock: Arc<dyn TimeProvider>,
}

impl M2Transformer {
    pub fn new(clock: Arc<dyn TimeProvider>) -> Self {
        Self { clock }
    }
}

impl Transformer for M2Transformer {
    fn transform(&self, raw: &RawRecord) -> Result<NormalizedMetric, TransformError> {
        let observations = require(raw, "observations")?
            .as_array()
            .ok_or_else(|| TransformError::InvalidValue {
                field: "observations".into(),
                reason: "expected a list".into(),
            })?;
        debug!("Processing {} observations from FRED", observations.len());

        let today = self.clock.today();
        let mut latest: Option<(NaiveDate, f64)> = None;
        for obs in observations {
            let Some(date_str) = obs.get("date").and_then(|d| d.as_str()) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
                warn!("Invalid date format: {}", date_str);
                continue;
            };
            if date > today {
                warn!("Skipping future date: {}", date_str);
                continue;
            }
            // FRED 用 "." 表示缺失值
            let Some(value) = obs.get("value").and_then(|v| as_number(v, "value").ok()) else {
                continue;
            };
            if latest.is_none_or(|(d, _)| date > d) {
                latest = Some((date, value));
            }
        }

        let (date, value) = latest.ok_or_else(|| {
            TransformError::NoData("no valid observations in FRED data".to_string())
        })?;
        Ok(NormalizedMetric::new(value, date, "USD").with_meta("source", "fred"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use sigflow_core::common::time::FakeClockProvider;

    fn transformer() -> M2Transformer {
        M2Transformer::new(Arc::new(FakeClockProvider::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap(),
        )))
    }

    #[test]
    fn test_latest_valid_observation_wins() {
        let raw = json!({"observations": [
            {"date": "2024-07-01", "value": "99999"},
            {"date": "2024-05-01", "value": "."},
            {"date": "2024-03-01", "value": "20800.5"},
            {"date": "2024-04-01", "value": "20850.1"},
            {"date": "garbage", "value": "1"}
        ]});
        let m = transformer().transform(&raw).unwrap();
        assert_eq!(m.value, 20850.1);
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(m.units, "USD");
    }

    #[test]
    fn test_no_valid_observation() {
        let raw = json!({"observations": [{"date": "2024-05-01", "value": "."}]});
        assert!(matches!(
            transformer().transform(&raw),
            Err(TransformError::NoData(_))
        ));
        assert!(matches!(
            transformer().transform(&json!({})),
            Err(TransformError::MissingField(_))
        ));
    }
}
