use async_trait::async_trait;
use dashmap::DashMap;
use sigflow_core::cache::error::CacheError;
use sigflow_core::cache::port::Cache;

/// # Summary
/// 基于 DashMap 的内存缓存实现，承载单次管道运行内的抽取结果。
///
/// # Invariants
/// - 所有操作均通过并发哈希表 `DashMap` 执行。
/// - 没有过期与容量限制，容量上限等于一次运行中不同抽取请求的数量。
pub struct MemCache {
    // 缓存槽名 -> 序列化后的原始记录
    storage: DashMap<String, Vec<u8>>,
}

impl MemCache {
    /// # Summary
    /// 创建一个空缓存。
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }
}

impl Default for MemCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for MemCache {
    /// # Summary
    /// 写入原始字节。若存在同名键则覆盖。
    async fn set_raw(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.storage.insert(key.to_string(), value);
        Ok(())
    }

    /// # Summary
    /// 读取原始字节，返回克隆的独立副本。
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.storage.get(key).map(|v| v.value().clone()))
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.storage.remove(key);
        Ok(())
    }

    /// # Summary
    /// 清空全部条目。
    ///
    /// # Logic
    /// DashMap 按分片逐个加锁清空，清空期间不会有其他调用方 (引擎顺序执行)。
    async fn clear(&self) -> Result<(), CacheError> {
        self.storage.clear();
        Ok(())
    }

    async fn len(&self) -> usize {
        self.storage.len()
    }
}
