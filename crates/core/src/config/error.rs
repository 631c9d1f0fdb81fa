use thiserror::Error;

/// # Summary
/// 配置域错误。启动阶段出现即终止本次运行；
/// 单个信号缺少密钥只记告警，不经过此类型。
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件不存在或不可读
    #[error("Config file not found: {0}")]
    NotFound(String),
    /// 配置文件格式错误
    #[error("Config parse error: {0}")]
    Parse(String),
    /// 结构合法但语义不合法
    #[error("Invalid config: {0}")]
    Invalid(String),
    /// 必需密钥缺失
    #[error("Missing secret: {0}")]
    MissingSecret(String),
}
