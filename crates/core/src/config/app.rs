use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    // 本地数据根目录 (SQLite 库、文件输出)
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    // 滚动日志目录
    pub dir: String,
    // 日志文件名前缀
    pub file_prefix: String,
    // 未设置 RUST_LOG 时的默认过滤级别
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                dir: "data".to_string(),
            },
            log: LogConfig {
                dir: "logs".to_string(),
                file_prefix: "etl.log".to_string(),
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data.dir, "data");
        assert_eq!(config.log.dir, "logs");
        assert_eq!(config.log.file_prefix, "etl.log");
        assert_eq!(config.log.level, "info");
    }
}
