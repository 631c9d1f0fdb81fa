//! 测试替身：可计数的抽取器、固定输出的转换器与可记录的加载器。
//! 仅在启用 `test-utils` feature 时编译。

use crate::extract::error::ExtractError;
use crate::extract::port::Extractor;
use crate::load::error::LoadError;
use crate::load::port::Loader;
use crate::metric::entity::{NormalizedMetric, RawRecord};
use crate::transform::error::TransformError;
use crate::transform::port::Transformer;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// # Summary
/// 返回固定记录 (或固定错误) 的抽取器，记录 `fetch` 调用次数。
#[derive(Clone)]
pub struct MockExtractor {
    record: Option<RawRecord>,
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    /// 每次返回 `record`
    pub fn returning(record: RawRecord) -> Self {
        Self {
            record: Some(record),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 每次返回 `ExtractError::Network`
    pub fn failing() -> Self {
        Self {
            record: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 共享的调用计数器
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// 已发生的调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn fetch(&self) -> Result<RawRecord, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.record
            .clone()
            .ok_or_else(|| ExtractError::Network("mock extractor failure".to_string()))
    }
}

/// # Summary
/// 忽略输入、返回固定指标 (或固定错误) 的转换器。
pub struct StaticTransformer {
    metric: Option<NormalizedMetric>,
}

impl StaticTransformer {
    pub fn returning(metric: NormalizedMetric) -> Self {
        Self {
            metric: Some(metric),
        }
    }

    pub fn failing() -> Self {
        Self { metric: None }
    }
}

impl Transformer for StaticTransformer {
    fn transform(&self, _raw: &RawRecord) -> Result<NormalizedMetric, TransformError> {
        self.metric
            .clone()
            .ok_or_else(|| TransformError::MissingField("mock".to_string()))
    }
}

/// # Summary
/// 把收到的指标记录到共享列表中的加载器，可配置为总是失败或总是拒收。
#[derive(Clone)]
pub struct RecordingLoader {
    received: Arc<Mutex<Vec<NormalizedMetric>>>,
    mode: LoaderMode,
}

#[derive(Clone, Copy)]
enum LoaderMode {
    Accept,
    Fail,
    Reject,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::with_mode(LoaderMode::Accept)
    }

    /// 每次返回 `LoadError::Rejected`，但仍记录收到的指标
    pub fn failing() -> Self {
        Self::with_mode(LoaderMode::Fail)
    }

    /// 每次返回 `Ok(false)`
    pub fn rejecting() -> Self {
        Self::with_mode(LoaderMode::Reject)
    }

    fn with_mode(mode: LoaderMode) -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
            mode,
        }
    }

    /// 已收到的指标快照
    pub async fn received(&self) -> Vec<NormalizedMetric> {
        self.received.lock().await.clone()
    }
}

impl Default for RecordingLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for RecordingLoader {
    async fn load(&self, metric: &NormalizedMetric) -> Result<bool, LoadError> {
        self.received.lock().await.push(metric.clone());
        match self.mode {
            LoaderMode::Accept => Ok(true),
            LoaderMode::Reject => Ok(false),
            LoaderMode::Fail => Err(LoadError::Rejected("mock loader failure".to_string())),
        }
    }
}
