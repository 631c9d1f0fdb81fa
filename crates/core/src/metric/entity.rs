use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// # Summary
/// 抽取器的原始输出。对引擎不透明，只由转换器解读。
pub type RawRecord = Value;

/// # Summary
/// 转换器输出的标准化指标记录，也是所有加载器必须接受的契约。
///
/// # Invariants
/// - `signal_name` 由引擎在转换完成后注入，会覆盖转换器写入的任何值。
/// - `metadata` 承载 value/date/units 之外的任意附加字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetric {
    // 指标数值
    pub value: f64,
    // 观测日期
    pub date: NaiveDate,
    // 计量单位 (USD, percentage, index, BTC ...)
    pub units: String,
    // 所属信号名称
    #[serde(default)]
    pub signal_name: String,
    // 附加元数据
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl NormalizedMetric {
    /// # Summary
    /// 创建一条不含元数据、尚未绑定信号名的指标记录。
    pub fn new(value: f64, date: NaiveDate, units: impl Into<String>) -> Self {
        Self {
            value,
            date,
            units: units.into(),
            signal_name: String::new(),
            metadata: Map::new(),
        }
    }

    /// 追加一条元数据，同名键覆盖。
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_serializes_core_fields() {
        let metric = NormalizedMetric::new(65000.0, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "USD")
            .with_meta("source", "coingecko");
        let v = serde_json::to_value(&metric).unwrap();
        assert_eq!(v["value"], json!(65000.0));
        assert_eq!(v["date"], json!("2024-05-01"));
        assert_eq!(v["units"], json!("USD"));
        assert_eq!(v["signal_name"], json!(""));
        assert_eq!(v["metadata"]["source"], json!("coingecko"));
    }
}
