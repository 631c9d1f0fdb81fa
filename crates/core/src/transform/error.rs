use thiserror::Error;

/// # Summary
/// 转换域错误枚举，原始数据缺字段或字段类型不符时返回。
#[derive(Error, Debug)]
pub enum TransformError {
    // 必需字段不存在
    #[error("Missing field: {0}")]
    MissingField(String),
    // 字段存在但无法解释为期望的类型
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    // 原始数据中没有任何可用观测
    #[error("No usable data: {0}")]
    NoData(String),
}
