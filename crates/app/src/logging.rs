use sigflow_core::config::app::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// # Summary
/// 初始化全局日志：标准输出 + 按天滚动的文件。
///
/// # Logic
/// 1. `RUST_LOG` 优先，未设置时使用 `log.level`。
/// 2. 文件输出经非阻塞写入器，关闭 ANSI 颜色。
///
/// # Returns
/// 文件写入器的守卫，必须持有到进程退出，否则缓冲的日志会丢失。
pub fn init(cfg: &LogConfig) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let appender = tracing_appender::rolling::daily(&cfg.dir, &cfg.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cfg.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()?;
    Ok(guard)
}
