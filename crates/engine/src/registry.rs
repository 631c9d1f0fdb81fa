use sigflow_core::common::Params;
use sigflow_core::config::entity::PluginSpec;
use sigflow_core::extract::port::Extractor;
use sigflow_core::load::port::Loader;
use sigflow_core::plugin::error::PluginError;
use sigflow_core::plugin::port::{
    ExtractorCtor, LoaderCtor, LoaderInit, PluginFactory, PluginKind, TransformerCtor,
};
use sigflow_core::transform::port::Transformer;
use sigflow_feed::{FeedKind, FeedModule};
use sigflow_store::{LoaderKind, StoreModule};
use sigflow_transform::{TransformKind, TransformModule};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// # Summary
/// 插件解析器：符号名 -> 构造函数的静态表，加上按模块路径注册的工厂。
///
/// # Invariants
/// - 在交给引擎之前完成全部注册，此后只读。
/// - 解析失败只返回 `PluginError`，由引擎归入当前信号。
#[derive(Default, Clone)]
pub struct PluginRegistry {
    extractors: HashMap<String, ExtractorCtor>,
    transformers: HashMap<String, TransformerCtor>,
    loaders: HashMap<String, LoaderCtor>,
    modules: HashMap<String, Arc<dyn PluginFactory>>,
}

impl PluginRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// # Summary
    /// 注册全部内置插件与内置模块。
    ///
    /// # Logic
    /// 1. 抽取器、转换器、加载器按符号名注册。
    /// 2. `sigflow_feed`、`sigflow_transform`、`sigflow_store` 注册为模块。
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in FeedKind::ALL {
            registry.register_extractor(kind.name(), move |p: &Params| kind.build(p));
        }
        for kind in TransformKind::ALL {
            registry.register_transformer(kind.name(), move |p: &Params| kind.build(p));
        }
        for kind in LoaderKind::ALL {
            registry.register_loader(kind.name(), move |init: &LoaderInit| kind.build(init));
        }
        registry
            .register_module(Arc::new(FeedModule))
            .register_module(Arc::new(TransformModule))
            .register_module(Arc::new(StoreModule));
        registry
    }

    pub fn register_extractor<F>(&mut self, name: &str, ctor: F) -> &mut Self
    where
        F: Fn(&Params) -> Result<Box<dyn Extractor>, PluginError> + Send + Sync + 'static,
    {
        self.extractors.insert(name.to_string(), Arc::new(ctor));
        self
    }

    pub fn register_transformer<F>(&mut self, name: &str, ctor: F) -> &mut Self
    where
        F: Fn(&Params) -> Result<Box<dyn Transformer>, PluginError> + Send + Sync + 'static,
    {
        self.transformers.insert(name.to_string(), Arc::new(ctor));
        self
    }

    pub fn register_loader<F>(&mut self, name: &str, ctor: F) -> &mut Self
    where
        F: Fn(&LoaderInit) -> Result<Box<dyn Loader>, PluginError> + Send + Sync + 'static,
    {
        self.loaders.insert(name.to_string(), Arc::new(ctor));
        self
    }

    /// 以工厂自报的模块路径注册，同名覆盖
    pub fn register_module(&mut self, factory: Arc<dyn PluginFactory>) -> &mut Self {
        self.modules.insert(factory.module().to_string(), factory);
        self
    }

    /// 是否注册了该符号名
    pub fn contains(&self, kind: PluginKind, name: &str) -> bool {
        match kind {
            PluginKind::Extractor => self.extractors.contains_key(name),
            PluginKind::Transformer => self.transformers.contains_key(name),
            PluginKind::Loader => self.loaders.contains_key(name),
        }
    }

    fn module(&self, kind: PluginKind, module: &str) -> Result<&Arc<dyn PluginFactory>, PluginError> {
        self.modules.get(module).ok_or_else(|| PluginError::UnknownModule {
            kind,
            module: module.to_string(),
        })
    }

    /// # Summary
    /// 构造抽取器。
    ///
    /// # Arguments
    /// * `spec`: 配置中的声明。
    /// * `params`: 已合并 (描述符参数 < 信号参数 < 密钥) 的最终参数。
    pub fn resolve_extractor(
        &self,
        spec: &PluginSpec,
        params: &Params,
    ) -> Result<Box<dyn Extractor>, PluginError> {
        debug!(plugin = %spec, "Resolving extractor");
        match spec {
            PluginSpec::Name(name) => {
                let ctor = self.extractors.get(name).ok_or_else(|| PluginError::UnknownPlugin {
                    kind: PluginKind::Extractor,
                    name: name.clone(),
                })?;
                ctor(params)
            }
            PluginSpec::Explicit { module, class, .. } => self
                .module(PluginKind::Extractor, module)?
                .extractor(class, params),
        }
    }

    /// # Summary
    /// 构造转换器，参数取自描述符自带的 `params`。
    pub fn resolve_transformer(&self, spec: &PluginSpec) -> Result<Box<dyn Transformer>, PluginError> {
        debug!(plugin = %spec, "Resolving transformer");
        let params = spec.params();
        match spec {
            PluginSpec::Name(name) => {
                let ctor = self
                    .transformers
                    .get(name)
                    .ok_or_else(|| PluginError::UnknownPlugin {
                        kind: PluginKind::Transformer,
                        name: name.clone(),
                    })?;
                ctor(&params)
            }
            PluginSpec::Explicit { module, class, .. } => self
                .module(PluginKind::Transformer, module)?
                .transformer(class, &params),
        }
    }

    /// # Summary
    /// 构造加载器。
    ///
    /// # Logic
    /// 1. 先以 `params` 约定构造。
    /// 2. 构造函数返回 `SignatureMismatch` 时改用 `config` 约定重试一次。
    /// 3. 其他错误或第二次不匹配直接返回。
    pub fn resolve_loader(&self, spec: &PluginSpec) -> Result<Box<dyn Loader>, PluginError> {
        debug!(plugin = %spec, "Resolving loader");
        let init = LoaderInit::Params(spec.params());
        match spec {
            PluginSpec::Name(name) => {
                let ctor = self.loaders.get(name).ok_or_else(|| PluginError::UnknownPlugin {
                    kind: PluginKind::Loader,
                    name: name.clone(),
                })?;
                with_convention_retry(spec, &init, |i| ctor(i))
            }
            PluginSpec::Explicit { module, class, .. } => {
                let factory = self.module(PluginKind::Loader, module)?;
                with_convention_retry(spec, &init, |i| factory.loader(class, i))
            }
        }
    }
}

fn with_convention_retry<F>(
    spec: &PluginSpec,
    init: &LoaderInit,
    build: F,
) -> Result<Box<dyn Loader>, PluginError>
where
    F: Fn(&LoaderInit) -> Result<Box<dyn Loader>, PluginError>,
{
    match build(init) {
        Err(PluginError::SignatureMismatch(reason)) => {
            let retry = init.swapped();
            debug!(
                plugin = %spec,
                "Loader rejected `{}` convention ({}), retrying with `{}`",
                init.convention(),
                reason,
                retry.convention()
            );
            build(&retry)
        }
        other => other,
    }
}
