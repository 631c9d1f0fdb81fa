use crate::plugin::port::PluginKind;
use thiserror::Error;

/// # Summary
/// 插件解析与构造错误。只对当前信号致命，不会中断整个批次。
#[derive(Error, Debug)]
pub enum PluginError {
    // 符号名在静态注册表中不存在
    #[error("Unknown {kind} plugin: {name}")]
    UnknownPlugin { kind: PluginKind, name: String },
    // 显式描述符引用了未注册的模块
    #[error("Unknown {kind} module: {module}")]
    UnknownModule { kind: PluginKind, module: String },
    // 模块存在但不提供该类
    #[error("Module {module} has no {kind} class {class}")]
    UnknownClass {
        kind: PluginKind,
        module: String,
        class: String,
    },
    // 构造约定不匹配 (params/config)，解析器会换一种约定重试
    #[error("Construction convention mismatch: {0}")]
    SignatureMismatch(String),
    // 参数缺失或取值非法
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    // 转换器以空列表形式声明
    #[error("Transformer list is empty")]
    EmptyTransformerList,
    // 插件内部资源初始化失败
    #[error("Construction failed: {0}")]
    Construction(String),
}
