use async_trait::async_trait;
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::load::error::LoadError;
use sigflow_core::load::port::Loader;
use sigflow_core::metric::entity::NormalizedMetric;
use sigflow_core::plugin::error::PluginError;
use std::path::PathBuf;
use tracing::info;

/// 文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    fn parse(raw: &str) -> Result<Self, PluginError> {
        match raw.to_ascii_lowercase().as_str() {
            "json" => Ok(FileFormat::Json),
            "csv" => Ok(FileFormat::Csv),
            other => Err(PluginError::Construction(format!(
                "unsupported file format `{}`, expected json or csv",
                other
            ))),
        }
    }
}

/// # Summary
/// 把指标写入单个文件的加载器，每次写入覆盖整个文件。
///
/// # Invariants
/// - 只接受 `config` 构造约定。
pub struct FileLoader {
    file_path: PathBuf,
    format: FileFormat,
}

impl FileLoader {
    /// # Arguments
    /// * `config`: `file_path` (必填)、`format` (`json` 默认，或 `csv`)。
    pub fn from_config(config: &Params) -> Result<Self, PluginError> {
        let file_path = config
            .get_str("file_path")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PluginError::InvalidParams("file_loader requires `file_path`".into()))?;
        Ok(Self {
            file_path: PathBuf::from(file_path),
            format: FileFormat::parse(config.str_or("format", "json"))?,
        })
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }
}

/// 单行 CSV：固定列 + 元数据 JSON
pub(crate) fn render_csv(metric: &NormalizedMetric) -> Result<Vec<u8>, LoadError> {
    let metadata =
        serde_json::to_string(&metric.metadata).map_err(|e| LoadError::Serialize(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["signal_name", "date", "value", "units", "metadata"])
        .map_err(|e| LoadError::Serialize(e.to_string()))?;
    writer
        .write_record([
            metric.signal_name.clone(),
            metric.date.to_string(),
            metric.value.to_string(),
            metric.units.clone(),
            metadata,
        ])
        .map_err(|e| LoadError::Serialize(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| LoadError::Serialize(e.to_string()))
}

#[async_trait]
impl Loader for FileLoader {
    async fn load(&self, metric: &NormalizedMetric) -> Result<bool, LoadError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LoadError::Io(e.to_string()))?;
        }

        let bytes = match self.format {
            FileFormat::Json => serde_json::to_vec_pretty(metric)
                .map_err(|e| LoadError::Serialize(e.to_string()))?,
            FileFormat::Csv => render_csv(metric)?,
        };
        tokio::fs::write(&self.file_path, bytes)
            .await
            .map_err(|e| LoadError::Io(e.to_string()))?;

        info!("Data saved to {}", self.file_path.display());
        Ok(true)
    }
}
