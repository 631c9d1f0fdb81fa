use sigflow_core::cache::port::{Cache, CacheExt};
use sigflow_core::common::Params;
use sigflow_core::extract::error::ExtractError;
use sigflow_core::extract::port::Extractor;
use sigflow_core::metric::entity::RawRecord;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use crate::canonical::CacheKey;

/// # Summary
/// 单次运行内的抽取结果缓存。
///
/// # Invariants
/// - 命中时不调用抽取器。
/// - 抓取失败不写入任何条目。
/// - 后端读失败按未命中处理，写失败只告警；缓存故障永远不会让信号失败。
pub struct ExtractionCache {
    backend: Arc<dyn Cache>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ExtractionCache {
    pub fn new(backend: Arc<dyn Cache>) -> Self {
        Self {
            backend,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// # Summary
    /// 按已构造的键读取缓存，未命中时抓取并写入。
    ///
    /// # Logic
    /// 1. 读缓存；命中直接返回。
    /// 2. 读失败记告警，视为未命中。
    /// 3. 调用 `fetch()`；失败直接返回错误。
    /// 4. 写缓存；写失败记告警，仍返回抓取结果。
    pub async fn get_or_fetch(
        &self,
        key: &CacheKey,
        extractor: &dyn Extractor,
    ) -> Result<RawRecord, ExtractError> {
        match self.backend.get::<RawRecord>(key.digest()).await {
            Ok(Some(record)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = key.digest(), "Extraction cache hit");
                return Ok(record);
            }
            Ok(None) => {}
            Err(e) => warn!(key = key.digest(), "Extraction cache read failed, treating as miss: {}", e),
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = key.digest(), "Extraction cache miss");
        let record = extractor.fetch().await?;

        if let Err(e) = self.backend.set(key.digest(), &record).await {
            warn!(key = key.digest(), "Extraction cache write failed: {}", e);
        }
        Ok(record)
    }

    /// # Summary
    /// 构造键并经缓存抓取；键无法构造时退化为不缓存的直接抓取。
    ///
    /// # Arguments
    /// * `identity`: 抽取器身份 (符号名或 `module::class`)。
    /// * `params`: 最终传给抽取器的参数。
    /// * `extractor`: 已构造的抽取器。
    pub async fn fetch(
        &self,
        identity: &str,
        params: &Params,
        extractor: &dyn Extractor,
    ) -> Result<RawRecord, ExtractError> {
        match CacheKey::build(identity, params) {
            Ok(key) => self.get_or_fetch(&key, extractor).await,
            Err(e) => {
                warn!(extractor = identity, "Cannot build cache key, fetching uncached: {}", e);
                self.misses.fetch_add(1, Ordering::Relaxed);
                extractor.fetch().await
            }
        }
    }

    /// 清空全部条目并重置计数
    pub async fn clear(&self) {
        if let Err(e) = self.backend.clear().await {
            warn!("Failed to clear extraction cache: {}", e);
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// 当前缓存条目数
    pub async fn len(&self) -> usize {
        self.backend.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
