use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;
use sigflow_core::cache::port::Cache;
use sigflow_core::common::{Params, merge_params};
use sigflow_core::config::entity::{NamedSignal, PipelineConfig, PluginSpec, SignalConfig};
use sigflow_core::config::error::ConfigError;
use sigflow_core::engine::entity::{RunReport, SignalOutcome, SignalState, SignalStatus, Stage};
use sigflow_core::engine::error::{SignalError, StageError};
use sigflow_core::load::error::LoadError;
use sigflow_core::metric::entity::NormalizedMetric;
use sigflow_core::secrets::port::SecretStore;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::cache::ExtractionCache;
use crate::registry::PluginRegistry;
use crate::secrets::SecretsResolver;

/// # Summary
/// 单个信号的状态跟踪器。panic 发生时据此判断所处阶段。
struct SignalTracker<'a> {
    name: &'a str,
    state: Mutex<SignalState>,
}

impl<'a> SignalTracker<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            state: Mutex::new(SignalState::Pending),
        }
    }

    fn current(&self) -> SignalState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn advance(&self, next: SignalState) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.can_transition_to(next) {
            debug!(signal = self.name, "{:?} -> {:?}", *state, next);
            *state = next;
        } else {
            warn!(signal = self.name, "Illegal transition {:?} -> {:?} ignored", *state, next);
        }
    }
}

/// # Summary
/// ETL 编排引擎。
///
/// # Invariants
/// - 信号按配置顺序逐个处理，同一时刻只处理一个。
/// - 任何信号的错误或 panic 都不会越过该信号的边界。
/// - 所有日志事件都在注入的 span 内发出。
pub struct EtlEngine {
    config: PipelineConfig,
    registry: PluginRegistry,
    secrets: SecretsResolver,
    cache: ExtractionCache,
    span: Span,
}

impl EtlEngine {
    /// # Summary
    /// 创建引擎实例。
    ///
    /// # Arguments
    /// * `config`: 已加载的管道配置。
    /// * `registry`: 已完成注册的插件表。
    /// * `secrets`: 密钥来源。
    /// * `cache`: 抽取缓存后端。
    /// * `span`: 本引擎的可观测性上下文。
    pub fn new(
        config: PipelineConfig,
        registry: PluginRegistry,
        secrets: Arc<dyn SecretStore>,
        cache: Arc<dyn Cache>,
        span: Span,
    ) -> Self {
        Self {
            config,
            registry,
            secrets: SecretsResolver::new(secrets),
            cache: ExtractionCache::new(cache),
            span,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }

    /// # Summary
    /// 启动时校验必需的密钥，任一缺失即失败。
    ///
    /// # Returns
    /// 第一个缺失项的 `ConfigError::MissingSecret`。
    pub fn require_secrets<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ConfigError> {
        let _enter = self.span.enter();
        let values = self.secrets.require(names).inspect_err(|e| {
            error!("Required secret check failed: {}", e);
        })?;
        info!("{} required secret(s) present", values.len());
        Ok(())
    }

    /// # Summary
    /// 按配置顺序运行全部信号。
    ///
    /// # Logic
    /// 1. 清空抽取缓存。
    /// 2. 逐个处理信号，收集结果。
    /// 3. 输出运行汇总。
    ///
    /// # Returns
    /// 运行报告；本方法不会因单个信号失败而中断。
    pub async fn run(&self) -> RunReport {
        async {
            let run_id = uuid::Uuid::new_v4().to_string();
            let started_at = Utc::now();
            info!(run_id = %run_id, "Starting ETL run over {} signal(s)", self.config.signals.len());
            self.cache.clear().await;

            let mut outcomes = Vec::with_capacity(self.config.signals.len());
            for signal in &self.config.signals {
                outcomes.push(self.process(signal).await);
            }

            let report = RunReport {
                run_id,
                started_at,
                finished_at: Utc::now(),
                outcomes,
            };
            info!(
                run_id = %report.run_id,
                succeeded = report.succeeded(),
                partial = report.partial(),
                failed = report.failed(),
                cache_hits = self.cache.hits(),
                cache_misses = self.cache.misses(),
                "ETL run finished"
            );
            report
        }
        .instrument(self.span.clone())
        .await
    }

    /// # Summary
    /// 只运行一个信号。
    ///
    /// # Returns
    /// 仅当该信号 `Succeeded` 时返回 true；未知信号返回 false 且不触碰缓存。
    pub async fn run_signal(&self, name: &str) -> bool {
        self.run_signal_outcome(name)
            .await
            .is_some_and(|o| o.is_success())
    }

    /// # Summary
    /// 只运行一个信号并返回详细结果。
    ///
    /// # Returns
    /// 未知信号返回 None。
    pub async fn run_signal_outcome(&self, name: &str) -> Option<SignalOutcome> {
        async {
            let Some(signal) = self.config.signals.iter().find(|s| s.name == name) else {
                error!(signal = name, "Signal not found in configuration");
                return None;
            };
            self.cache.clear().await;
            Some(self.process(signal).await)
        }
        .instrument(self.span.clone())
        .await
    }

    /// # Summary
    /// 处理单个信号并把任何错误或 panic 归结为终态结果。
    async fn process(&self, signal: &NamedSignal) -> SignalOutcome {
        let span = info_span!(parent: &self.span, "signal", signal = %signal.name);
        async {
            info!("Processing signal: {}", signal.name);
            let tracker = SignalTracker::new(&signal.name);
            let result = AssertUnwindSafe(self.drive(signal, &tracker))
                .catch_unwind()
                .await;

            let status = match result {
                Ok(Ok(status)) => status,
                Ok(Err(e)) => {
                    tracker.advance(SignalState::Failed);
                    error!(stage = %e.stage, "Signal {} failed: {}", signal.name, e);
                    SignalStatus::Failed {
                        stage: e.stage,
                        error: e.source.to_string(),
                    }
                }
                Err(payload) => {
                    let stage = tracker.current().stage().unwrap_or(Stage::Load);
                    let err = SignalError::Panic(panic_message(payload.as_ref()));
                    tracker.advance(SignalState::Failed);
                    error!(stage = %stage, "Signal {} failed: {}", signal.name, err);
                    SignalStatus::Failed {
                        stage,
                        error: err.to_string(),
                    }
                }
            };

            SignalOutcome {
                signal_name: signal.name.clone(),
                status,
            }
        }
        .instrument(span)
        .await
    }

    /// 抽取 -> 转换 -> 加载
    async fn drive(
        &self,
        signal: &NamedSignal,
        tracker: &SignalTracker<'_>,
    ) -> Result<SignalStatus, StageError> {
        let cfg = &signal.config;

        tracker.advance(SignalState::Extracting);
        let params = self.extractor_params(&signal.name, cfg);
        let extractor = self
            .registry
            .resolve_extractor(&cfg.extractor, &params)
            .map_err(|e| StageError::new(Stage::Extraction, e))?;
        let raw = self
            .cache
            .fetch(&cfg.extractor.identity(), &params, extractor.as_ref())
            .await
            .map_err(|e| StageError::new(Stage::Extraction, e))?;
        debug!(plugin = %cfg.extractor, "Extraction complete");

        tracker.advance(SignalState::Transforming);
        let spec = cfg
            .transformer
            .primary()
            .map_err(|e| StageError::new(Stage::Transformation, e))?;
        let transformer = self
            .registry
            .resolve_transformer(spec)
            .map_err(|e| StageError::new(Stage::Transformation, e))?;
        let mut metric = transformer
            .transform(&raw)
            .map_err(|e| StageError::new(Stage::Transformation, e))?;
        metric.signal_name = signal.name.clone();
        debug!(plugin = %spec, value = metric.value, date = %metric.date, "Transformation complete");

        tracker.advance(SignalState::Loading);
        let loaders = if cfg.loaders.is_empty() {
            &self.config.defaults.loaders
        } else {
            &cfg.loaders
        };
        let mut failed_loaders = Vec::new();
        for spec in loaders {
            // 单个加载器的 panic 与错误同等对待，不影响其余加载器
            let result = AssertUnwindSafe(self.load_one(spec, &metric))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(SignalError::Panic(panic_message(payload.as_ref()))));
            if let Err(e) = result {
                warn!(stage = %Stage::Load, plugin = %spec, "Loader failed: {}", e);
                failed_loaders.push(spec.identity());
            }
        }

        if failed_loaders.is_empty() {
            tracker.advance(SignalState::Succeeded);
            info!("Signal {} processed successfully", signal.name);
            Ok(SignalStatus::Succeeded)
        } else {
            tracker.advance(SignalState::PartiallyLoaded);
            warn!(
                "Signal {} processed but not fully loaded; failed loaders: {}",
                signal.name,
                failed_loaders.join(", ")
            );
            Ok(SignalStatus::PartiallyLoaded { failed_loaders })
        }
    }

    /// 构造并调用单个加载器；`Ok(false)` 也算失败
    async fn load_one(&self, spec: &PluginSpec, metric: &NormalizedMetric) -> Result<(), SignalError> {
        let loader = self.registry.resolve_loader(spec)?;
        if loader.load(metric).await? {
            debug!(plugin = %spec, "Loader accepted metric");
            Ok(())
        } else {
            Err(LoadError::Rejected("loader reported failure".to_string()).into())
        }
    }

    /// # Summary
    /// 计算抽取器最终参数：描述符参数 < 信号 `extractor_params` < 映射的密钥。
    ///
    /// # Logic
    /// 1. 解析 `secrets` 与 `secret_mapping` 引用的全部密钥。
    /// 2. 缺失的密钥逐个告警，继续处理。
    /// 3. 按 `secret_mapping` 把密钥值写入对应参数名。
    fn extractor_params(&self, name: &str, cfg: &SignalConfig) -> Params {
        let mut wanted: Vec<&str> = cfg.secrets.iter().map(String::as_str).collect();
        for secret in cfg.secret_mapping.values() {
            if !wanted.contains(&secret.as_str()) {
                wanted.push(secret);
            }
        }

        let resolved = self.secrets.resolve(&wanted);
        for missing in &resolved.missing {
            warn!(signal = name, secret = %missing, "Missing secret, continuing without it");
        }

        let mut secret_layer = Params::new();
        for (param, secret) in &cfg.secret_mapping {
            if let Some(value) = resolved.values.get(secret) {
                secret_layer.insert(param.clone(), Value::String(value.clone()));
            }
        }

        let spec_params = cfg.extractor.params();
        merge_params([&spec_params, &cfg.extractor_params, &secret_layer])
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
