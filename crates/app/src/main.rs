use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sigflow_cache::mem::MemCache;
use sigflow_engine::config::load_pipeline_config;
use sigflow_engine::pipeline::EtlEngine;
use sigflow_engine::registry::PluginRegistry;
use sigflow_engine::secrets::EnvSecretStore;
use tracing::{debug, info, info_span, warn};

mod cli;
mod logging;
mod settings;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化缓存、密钥库与插件注册表，并注入 `EtlEngine`。
///
/// # Logic
/// 1. 解析命令行，载入 `.env`。
/// 2. 组装应用配置并初始化日志。
/// 3. 读取管道配置并校验必需密钥，失败即退出 (非零退出码)。
/// 4. 运行全部信号或 `--signal` 指定的单个信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::Args::parse();
    let dotenv = dotenvy::dotenv();

    // 1. 应用配置与日志
    let settings = settings::load(&args)?;
    let _guard = logging::init(&settings.log)?;
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env: {}", e),
    }
    info!("sigflow starting, config: {}", args.config.display());

    // 2. 基础设施
    sigflow_store::config::set_root_dir(PathBuf::from(&settings.data.dir));
    let pipeline = load_pipeline_config(&args.config)?;
    let cache = Arc::new(MemCache::new());
    let secrets = Arc::new(EnvSecretStore);
    let registry = PluginRegistry::with_builtins();

    // 3. 引擎
    let engine = EtlEngine::new(
        pipeline,
        registry,
        secrets,
        cache,
        info_span!("etl", config = %args.config.display()),
    );

    engine.require_secrets(&args.required_secrets)?;

    // 4. 运行
    match &args.signal {
        Some(name) => {
            if let Some(outcome) = engine.run_signal_outcome(name).await {
                info!(signal = %name, "Signal finished: {:?}", outcome.status);
            }
        }
        None => {
            let report = engine.run().await;
            for outcome in &report.outcomes {
                debug!(signal = %outcome.signal_name, "{:?}", outcome.status);
            }
        }
    }

    info!("sigflow finished");
    Ok(())
}
