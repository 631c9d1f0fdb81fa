use crate::common::Params;
use crate::extract::port::Extractor;
use crate::load::port::Loader;
use crate::plugin::error::PluginError;
use crate::transform::port::Transformer;
use std::fmt;
use std::sync::Arc;

/// # Summary
/// 插件种类，用于日志与错误信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Extractor,
    Transformer,
    Loader,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Extractor => write!(f, "extractor"),
            PluginKind::Transformer => write!(f, "transformer"),
            PluginKind::Loader => write!(f, "loader"),
        }
    }
}

/// # Summary
/// 加载器的两种构造约定。
///
/// # Invariants
/// - 同一份映射可以以任一约定传入；构造函数不接受当前约定时
///   返回 `PluginError::SignatureMismatch`，由解析器改用另一种约定重试。
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderInit {
    Params(Params),
    Config(Params),
}

impl LoaderInit {
    /// 约定名称
    pub fn convention(&self) -> &'static str {
        match self {
            LoaderInit::Params(_) => "params",
            LoaderInit::Config(_) => "config",
        }
    }

    /// 取得内部映射
    pub fn map(&self) -> &Params {
        match self {
            LoaderInit::Params(m) | LoaderInit::Config(m) => m,
        }
    }

    /// 以另一种约定包装同一份映射
    pub fn swapped(&self) -> LoaderInit {
        match self {
            LoaderInit::Params(m) => LoaderInit::Config(m.clone()),
            LoaderInit::Config(m) => LoaderInit::Params(m.clone()),
        }
    }

    /// # Summary
    /// 要求 `params` 约定，否则返回不匹配错误。
    pub fn expect_params(&self) -> Result<&Params, PluginError> {
        match self {
            LoaderInit::Params(m) => Ok(m),
            LoaderInit::Config(_) => Err(PluginError::SignatureMismatch(
                "expected `params` mapping".to_string(),
            )),
        }
    }

    /// # Summary
    /// 要求 `config` 约定，否则返回不匹配错误。
    pub fn expect_config(&self) -> Result<&Params, PluginError> {
        match self {
            LoaderInit::Config(m) => Ok(m),
            LoaderInit::Params(_) => Err(PluginError::SignatureMismatch(
                "expected `config` mapping".to_string(),
            )),
        }
    }
}

/// 抽取器构造函数
pub type ExtractorCtor =
    Arc<dyn Fn(&Params) -> Result<Box<dyn Extractor>, PluginError> + Send + Sync>;

/// 转换器构造函数
pub type TransformerCtor =
    Arc<dyn Fn(&Params) -> Result<Box<dyn Transformer>, PluginError> + Send + Sync>;

/// 加载器构造函数
pub type LoaderCtor =
    Arc<dyn Fn(&LoaderInit) -> Result<Box<dyn Loader>, PluginError> + Send + Sync>;

/// # Summary
/// 外部实现描述符的模块工厂接口 (Port)。
/// 配置中形如 `{module, class, params}` 的显式描述符通过已注册的模块工厂按类名构造，
/// 取代运行时反射。
///
/// # Invariants
/// - 实现类必须保证线程安全 (`Send` + `Sync`)。
/// - 不支持的类必须返回 `PluginError::UnknownClass`，默认实现即如此。
pub trait PluginFactory: Send + Sync {
    /// 模块路径，用于错误信息
    fn module(&self) -> &str;

    /// # Summary
    /// 按类名构造抽取器。
    fn extractor(&self, class: &str, _params: &Params) -> Result<Box<dyn Extractor>, PluginError> {
        Err(self.unknown_class(PluginKind::Extractor, class))
    }

    /// # Summary
    /// 按类名构造转换器。
    fn transformer(
        &self,
        class: &str,
        _params: &Params,
    ) -> Result<Box<dyn Transformer>, PluginError> {
        Err(self.unknown_class(PluginKind::Transformer, class))
    }

    /// # Summary
    /// 按类名构造加载器。
    fn loader(&self, class: &str, _init: &LoaderInit) -> Result<Box<dyn Loader>, PluginError> {
        Err(self.unknown_class(PluginKind::Loader, class))
    }

    /// 生成 `UnknownClass` 错误
    fn unknown_class(&self, kind: PluginKind, class: &str) -> PluginError {
        PluginError::UnknownClass {
            kind,
            module: self.module().to_string(),
            class: class.to_string(),
        }
    }
}
