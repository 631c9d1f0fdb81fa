use async_trait::async_trait;
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::extract::error::ExtractError;
use sigflow_core::extract::port::Extractor;
use sigflow_core::metric::entity::RawRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// # Summary
/// 抽取器装饰器：把每次成功抓取的原始记录另存为格式化 JSON。
///
/// # Invariants
/// - 写文件失败只记录警告，不影响抓取结果。
pub struct SnapshotExtractor {
    inner: Box<dyn Extractor>,
    output_file: PathBuf,
}

impl SnapshotExtractor {
    pub fn new(inner: Box<dyn Extractor>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            output_file: output_file.into(),
        }
    }

    /// # Summary
    /// 参数中带有非空 `output_file` 时包装抽取器，否则原样返回。
    pub fn wrap(inner: Box<dyn Extractor>, params: &Params) -> Box<dyn Extractor> {
        match params.get_str("output_file").filter(|p| !p.is_empty()) {
            Some(path) => Box::new(Self::new(inner, path)),
            None => inner,
        }
    }
}

async fn write_snapshot(path: &Path, record: &RawRecord) -> Result<(), String> {
    let text = serde_json::to_string_pretty(record).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }
    tokio::fs::write(path, text).await.map_err(|e| e.to_string())
}

#[async_trait]
impl Extractor for SnapshotExtractor {
    async fn fetch(&self) -> Result<RawRecord, ExtractError> {
        let record = self.inner.fetch().await?;
        match write_snapshot(&self.output_file, &record).await {
            Ok(()) => debug!(path = %self.output_file.display(), "Raw snapshot written"),
            Err(e) => warn!(
                path = %self.output_file.display(),
                "Failed to write raw snapshot: {}", e
            ),
        }
        Ok(record)
    }
}
