use async_trait::async_trait;
use sigflow_core::load::error::LoadError;
use sigflow_core::load::port::Loader;
use sigflow_core::metric::entity::NormalizedMetric;
use tracing::info;

/// # Summary
/// 只把指标打印到日志的加载器，总是成功。
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLoader;

#[async_trait]
impl Loader for ConsoleLoader {
    async fn load(&self, metric: &NormalizedMetric) -> Result<bool, LoadError> {
        info!(
            signal = %metric.signal_name,
            date = %metric.date,
            value = metric.value,
            units = %metric.units,
            metadata = %serde_json::Value::Object(metric.metadata.clone()),
            "Signal loaded"
        );
        Ok(true)
    }
}
