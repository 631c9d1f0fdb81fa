use crate::cache::error::CacheError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// # Summary
/// 单次管道运行内使用的 KV 存储接口 (Port)。
///
/// # Invariants
/// - 处理原始字节，保证 Trait 对象安全。
/// - 不提供过期与淘汰策略，生命周期由 `clear` 显式管理。
#[async_trait]
pub trait Cache: Send + Sync {
    /// # Summary
    /// 写入原始字节，同名键覆盖。
    async fn set_raw(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// # Summary
    /// 读取原始字节。
    ///
    /// # Returns
    /// 存在则返回 `Some(Vec<u8>)`，否则返回 `None`。
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// # Summary
    /// 删除指定键，键不存在时同样成功。
    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// # Summary
    /// 清空全部条目。每次管道运行开始时调用。
    async fn clear(&self) -> Result<(), CacheError>;

    /// 当前条目数
    async fn len(&self) -> usize;
}

/// # Summary
/// 缓存的强类型扩展，以 JSON 作为序列化格式。
///
/// # Invariants
/// - 自动为所有实现 `Cache` 的类型提供支持。
#[async_trait]
pub trait CacheExt: Cache {
    /// # Summary
    /// 存入可序列化对象。
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CacheError::Serialize(e.to_string()))?;
        self.set_raw(key, bytes).await
    }

    /// # Summary
    /// 取出并反序列化对象。
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| CacheError::Deserialize(e.to_string())),
            None => Ok(None),
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
