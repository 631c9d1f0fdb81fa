use thiserror::Error;

/// # Summary
/// 抽取域错误枚举，覆盖网络、鉴权、限流与响应解析失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 抽取失败不得在缓存中留下任何条目。
#[derive(Error, Debug)]
pub enum ExtractError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 远端返回非成功状态码
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    // 响应解析失败
    #[error("Parse error: {0}")]
    Parse(String),
    // 请求的数据在响应中不存在
    #[error("Data not found: {0}")]
    NotFound(String),
    // 缺少或无效的凭据
    #[error("Authentication error: {0}")]
    Auth(String),
    // 限流重试耗尽
    #[error("Rate limited: {0}")]
    RateLimited(String),
}
