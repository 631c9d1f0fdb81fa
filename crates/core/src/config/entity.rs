use crate::common::Params;
use crate::config::error::ConfigError;
use crate::plugin::error::PluginError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// 未配置任何加载器时使用的内置加载器
pub const DEFAULT_LOADER: &str = "sqlite_loader";

/// # Summary
/// 插件声明。两种形式在配置中并存，解析器统一处理。
///
/// # Invariants
/// - `Name`：符号名，在静态注册表中查找。
/// - `Explicit`：外部实现描述符，经模块工厂按类名构造。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSpec {
    Name(String),
    Explicit {
        module: String,
        class: String,
        #[serde(default)]
        params: Params,
    },
}

impl PluginSpec {
    /// # Summary
    /// 插件身份标识，参与缓存键计算。
    ///
    /// # Returns
    /// 符号名，或 `module::class`。
    pub fn identity(&self) -> String {
        match self {
            PluginSpec::Name(name) => name.clone(),
            PluginSpec::Explicit { module, class, .. } => format!("{}::{}", module, class),
        }
    }

    /// 描述符自带的参数，符号名形式为空。
    pub fn params(&self) -> Params {
        match self {
            PluginSpec::Name(_) => Params::new(),
            PluginSpec::Explicit { params, .. } => params.clone(),
        }
    }
}

impl fmt::Display for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity())
    }
}

/// # Summary
/// 转换器声明，支持单个或列表形式；列表只使用第一项。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformerSpec {
    One(PluginSpec),
    Many(Vec<PluginSpec>),
}

impl TransformerSpec {
    /// # Summary
    /// 取得实际生效的转换器声明。
    ///
    /// # Returns
    /// 空列表返回 `PluginError::EmptyTransformerList`。
    pub fn primary(&self) -> Result<&PluginSpec, PluginError> {
        match self {
            TransformerSpec::One(spec) => Ok(spec),
            TransformerSpec::Many(list) => list.first().ok_or(PluginError::EmptyTransformerList),
        }
    }
}

/// # Summary
/// 单个信号 (具名指标) 的定义。加载后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub extractor: PluginSpec,
    pub transformer: TransformerSpec,
    // 为空时使用默认加载器
    #[serde(default)]
    pub loaders: Vec<PluginSpec>,
    // 本信号需要的密钥名
    #[serde(default)]
    pub secrets: Vec<String>,
    // 抽取器参数名 -> 密钥名
    #[serde(default)]
    pub secret_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub extractor_params: Params,
}

/// 带名称的信号定义
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSignal {
    pub name: String,
    pub config: SignalConfig,
}

/// # Summary
/// 全局默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_loaders")]
    pub loaders: Vec<PluginSpec>,
}

fn default_loaders() -> Vec<PluginSpec> {
    vec![PluginSpec::Name(DEFAULT_LOADER.to_string())]
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            loaders: default_loaders(),
        }
    }
}

/// # Summary
/// 管道配置：按文件书写顺序排列的信号列表与全局默认值。
///
/// # Invariants
/// - 信号名唯一 (来源于映射键)。
/// - `signals` 顺序即运行顺序。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub signals: Vec<NamedSignal>,
    pub defaults: Defaults,
}

impl PipelineConfig {
    /// # Summary
    /// 从已完成模板解析的 JSON 树构建配置。
    ///
    /// # Logic
    /// 1. 顶层含 `signals` 映射时读取它与可选的 `defaults`。
    /// 2. 否则把整个顶层映射视为 信号名 -> 定义。
    /// 3. 逐个反序列化信号，错误信息带上信号名。
    ///
    /// # Arguments
    /// * `root`: 配置文件内容。
    ///
    /// # Returns
    /// 成功返回 `PipelineConfig`，结构不合法返回 `ConfigError`。
    pub fn from_value(root: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut top) = root else {
            return Err(ConfigError::Invalid(
                "top level must be a mapping".to_string(),
            ));
        };

        let (signals, defaults) = match top.remove("signals") {
            Some(Value::Object(signals)) => {
                let defaults = match top.remove("defaults") {
                    Some(v) => serde_json::from_value(v)
                        .map_err(|e| ConfigError::Invalid(format!("defaults: {}", e)))?,
                    None => Defaults::default(),
                };
                (signals, defaults)
            }
            Some(Value::Null) => (serde_json::Map::new(), Defaults::default()),
            Some(_) => {
                return Err(ConfigError::Invalid(
                    "`signals` must be a mapping".to_string(),
                ));
            }
            None => (top, Defaults::default()),
        };

        let mut named = Vec::with_capacity(signals.len());
        for (name, raw) in signals {
            let config: SignalConfig = serde_json::from_value(raw)
                .map_err(|e| ConfigError::Invalid(format!("signal `{}`: {}", name, e)))?;
            named.push(NamedSignal { name, config });
        }

        Ok(Self {
            signals: named,
            defaults,
        })
    }

    /// 按名称查找信号
    pub fn signal(&self, name: &str) -> Option<&SignalConfig> {
        self.signals
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.config)
    }

    /// 信号名列表 (运行顺序)
    pub fn signal_names(&self) -> Vec<&str> {
        self.signals.iter().map(|s| s.name.as_str()).collect()
    }
}
