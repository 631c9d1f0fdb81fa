use async_trait::async_trait;
use serde_json::json;
use sigflow_cache::mem::MemCache;
use sigflow_core::cache::error::CacheError;
use sigflow_core::cache::port::Cache;
use sigflow_core::common::Params;
use sigflow_core::test_utils::MockExtractor;
use sigflow_engine::cache::ExtractionCache;
use sigflow_engine::canonical::CacheKey;
use std::sync::Arc;

/// 读写都失败的缓存后端
struct BrokenCache;

#[async_trait]
impl Cache for BrokenCache {
    async fn set_raw(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheError> {
        Err(CacheError::Storage("write refused".into()))
    }
    async fn get_raw(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Storage("read refused".into()))
    }
    async fn del(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
    async fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Storage("clear refused".into()))
    }
    async fn len(&self) -> usize {
        0
    }
}

/// # Summary
/// 命中时不调用抽取器；失败的抓取不留条目。
#[tokio::test]
async fn test_get_or_fetch_hit_and_failure() -> anyhow::Result<()> {
    let cache = ExtractionCache::new(Arc::new(MemCache::new()));
    let key = CacheKey::build("mock", &Params::new())?;

    let failing = MockExtractor::failing();
    assert!(cache.get_or_fetch(&key, &failing).await.is_err());
    assert!(cache.is_empty().await);

    let ok = MockExtractor::returning(json!({"v": 1}));
    assert_eq!(cache.get_or_fetch(&key, &ok).await?, json!({"v": 1}));
    assert_eq!(cache.get_or_fetch(&key, &ok).await?, json!({"v": 1}));
    assert_eq!(ok.calls(), 1);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.len().await, 1);

    cache.clear().await;
    assert!(cache.is_empty().await);
    assert_eq!(cache.hits(), 0);
    Ok(())
}

/// # Summary
/// 后端故障只告警：读失败按未命中，写失败仍返回抓取结果。
#[tokio::test]
async fn test_backend_failures_are_not_fatal() -> anyhow::Result<()> {
    let cache = ExtractionCache::new(Arc::new(BrokenCache));
    let ex = MockExtractor::returning(json!([1, 2, 3]));
    let params: Params = serde_json::from_value(json!({"a": 1}))?;

    assert_eq!(cache.fetch("mock", &params, &ex).await?, json!([1, 2, 3]));
    assert_eq!(cache.fetch("mock", &params, &ex).await?, json!([1, 2, 3]));
    assert_eq!(ex.calls(), 2);
    cache.clear().await;
    Ok(())
}
