use thiserror::Error;

/// # Summary
/// 加载域错误枚举。单个加载器失败不影响同一信号的其他加载器。
#[derive(Error, Debug)]
pub enum LoadError {
    /// 文件系统读写失败
    #[error("IO error: {0}")]
    Io(String),
    /// 数据库操作失败
    #[error("Database error: {0}")]
    Database(String),
    /// 目标拒绝接收该记录
    #[error("Rejected: {0}")]
    Rejected(String),
    /// 序列化失败
    #[error("Serialize error: {0}")]
    Serialize(String),
}
