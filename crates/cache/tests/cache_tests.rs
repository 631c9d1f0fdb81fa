use serde_json::json;
use sigflow_cache::mem::MemCache;
use sigflow_core::cache::port::{Cache, CacheExt};

#[tokio::test]
async fn test_mem_cache_raw_ops() {
    let cache = MemCache::new();
    let key = "raw_key";
    let value = vec![1, 2, 3, 4];

    cache.set_raw(key, value.clone()).await.unwrap();
    let result = cache.get_raw(key).await.unwrap().unwrap();
    assert_eq!(result, value);

    cache.del(key).await.unwrap();
    assert!(cache.get_raw(key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_mem_cache_raw_record_roundtrip_through_ext() {
    let cache = MemCache::new();
    let record = json!({"bitcoin": {"usd": 65000, "usd_market_cap": 1.2e12}});

    cache.set("slot", &record).await.unwrap();
    let back: serde_json::Value = cache.get("slot").await.unwrap().unwrap();
    assert_eq!(back, record);

    let missing: Option<serde_json::Value> = cache.get("other").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_mem_cache_clear_empties_all_slots() {
    let cache = MemCache::new();
    cache.set("a", &json!(1)).await.unwrap();
    cache.set("b", &json!(2)).await.unwrap();
    assert_eq!(cache.len().await, 2);

    cache.clear().await.unwrap();
    assert_eq!(cache.len().await, 0);
    assert!(cache.get_raw("a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_mem_cache_corrupt_slot_reports_deserialize_error() {
    let cache = MemCache::new();
    cache.set_raw("bad", b"not json".to_vec()).await.unwrap();
    let result: Result<Option<serde_json::Value>, _> = cache.get("bad").await;
    assert!(result.is_err());
}
