use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

static ROOT_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 设置存储层的数据根目录。
///
/// # Logic
/// 1. 尝试将指定的路径保存到全局静态变量中。
/// 2. 如果已经设置过，则本次设置无效。
///
/// # Arguments
/// * `path` - 存储数据的根目录路径。
pub fn set_root_dir(path: PathBuf) {
    if let Err(ignored) = ROOT_DIR.set(path) {
        debug!("Store root dir already set, ignoring {}", ignored.display());
    }
}

/// 获取当前配置的数据根目录，未设置时为 "data"。
pub(crate) fn get_root_dir() -> PathBuf {
    ROOT_DIR
        .get()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("data"))
}
