use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use sigflow_core::transform::error::TransformError;

/// # Summary
/// 把 JSON 值解释为浮点数，接受数字与数字字符串。
pub(crate) fn as_number(value: &Value, field: &str) -> Result<f64, TransformError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(TransformError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a number, got {}", value),
        }),
    }
}

/// 取必需字段
pub(crate) fn require<'a>(value: &'a Value, field: &str) -> Result<&'a Value, TransformError> {
    value
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| TransformError::MissingField(field.to_string()))
}

/// Unix 秒 (数字或字符串) 转 UTC 日期
pub(crate) fn unix_date(value: &Value) -> Option<NaiveDate> {
    let secs = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(42), "x").unwrap(), 42.0);
        assert_eq!(as_number(&json!(" 1.5 "), "x").unwrap(), 1.5);
        assert!(as_number(&json!("."), "x").is_err());
        assert!(as_number(&json!(null), "x").is_err());
    }

    #[test]
    fn test_unix_date() {
        assert_eq!(
            unix_date(&json!(1_714_521_600)),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(
            unix_date(&json!("1714521600")),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(unix_date(&json!(true)), None);
    }
}
