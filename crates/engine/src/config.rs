use config::{Config, File, FileFormat};
use serde_json::Value;
use sigflow_core::config::entity::PipelineConfig;
use sigflow_core::config::error::ConfigError;
use sigflow_core::config::template;
use std::path::Path;
use tracing::{info, warn};

/// # Summary
/// 读取管道配置文件，模板变量取自进程环境。
pub fn load_pipeline_config(path: impl AsRef<Path>) -> Result<PipelineConfig, ConfigError> {
    load_pipeline_config_with(path, &|name: &str| std::env::var(name).ok())
}

/// # Summary
/// 读取管道配置文件，模板变量通过 `lookup` 解析。
///
/// # Logic
/// 1. 文件不存在返回 `ConfigError::NotFound`。
/// 2. 以 YAML 读入保序的 JSON 树，格式错误返回 `ConfigError::Parse`。
/// 3. 解析全部字符串中的 `{{NAME}}` / `${NAME}`，未解析的保留原文并告警。
/// 4. 构建 `PipelineConfig`。
pub fn load_pipeline_config_with<F>(
    path: impl AsRef<Path>,
    lookup: &F,
) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let mut root: Value = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml).required(true))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;

    let mut unresolved = template::resolve_value(&mut root, lookup);
    if !unresolved.is_empty() {
        unresolved.sort();
        unresolved.dedup();
        warn!(
            "Unresolved template variables in {}: {}",
            path.display(),
            unresolved.join(", ")
        );
    }

    let config = PipelineConfig::from_value(root)?;
    info!(
        "Loaded {} signal(s) from {}",
        config.signals.len(),
        path.display()
    );
    Ok(config)
}
