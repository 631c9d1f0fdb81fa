use crate::extract::error::ExtractError;
use crate::metric::entity::RawRecord;
use async_trait::async_trait;

/// # Summary
/// 数据抽取能力接口 (Port)。
/// 实例由插件注册表依据参数映射（可能包含已解析的密钥）构造。
///
/// # Invariants
/// - `fetch` 不接收参数，所有输入在构造时确定。
/// - 失败时必须返回 `ExtractError`，而不是空记录。
#[async_trait]
pub trait Extractor: Send + Sync {
    /// # Summary
    /// 从外部数据源抓取一次原始数据。
    ///
    /// # Logic
    /// 1. 构建请求并访问外部 API。
    /// 2. 校验响应结构。
    ///
    /// # Returns
    /// 成功返回原始记录，失败返回 `ExtractError`。
    async fn fetch(&self) -> Result<RawRecord, ExtractError>;
}
