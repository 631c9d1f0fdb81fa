use config::{Config, ConfigError, Environment};
use sigflow_core::config::app::AppConfig;

use crate::cli::Args;

/// # Summary
/// 组装应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 为底。
/// 2. 叠加 `SIGFLOW_` 前缀的环境变量 (如 `SIGFLOW_LOG__LEVEL`)。
/// 3. 命令行显式给出的目录最后覆盖。
pub fn load(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(
            Environment::with_prefix("SIGFLOW")
                .prefix_separator("_")
                .separator("__"),
        );
    if let Some(dir) = &args.data_dir {
        builder = builder.set_override("data.dir", dir.to_string_lossy().to_string())?;
    }
    if let Some(dir) = &args.log_dir {
        builder = builder.set_override("log.dir", dir.to_string_lossy().to_string())?;
    }
    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_defaults() {
        let args = Args::try_parse_from(["sigflow", "--data-dir", "/tmp/sigflow-data"]).unwrap();
        let settings = load(&args).unwrap();
        assert_eq!(settings.data.dir, "/tmp/sigflow-data");
        assert_eq!(settings.log.file_prefix, "etl.log");
    }
}
