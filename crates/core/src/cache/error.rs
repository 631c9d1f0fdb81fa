use thiserror::Error;

/// # Summary
/// 缓存后端错误。对引擎而言只是告警：读失败按未命中处理，写失败仅记录日志。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum CacheError {
    // 原始记录序列化失败
    #[error("Serialize error: {0}")]
    Serialize(String),
    // 缓存内容无法还原为原始记录
    #[error("Deserialize error: {0}")]
    Deserialize(String),
    // 底层存储故障
    #[error("Storage error: {0}")]
    Storage(String),
}

/// # Summary
/// 缓存键构造失败。触发该错误时引擎改走不缓存的直接抽取。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheKeyError {
    // 参数嵌套层数超过规范化上限
    #[error("Parameter nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}
