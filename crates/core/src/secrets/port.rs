/// # Summary
/// 密钥读取接口 (Port)。
///
/// # Invariants
/// - 空字符串视同缺失。
pub trait SecretStore: Send + Sync {
    /// # Summary
    /// 按名称读取密钥。
    ///
    /// # Returns
    /// 存在且非空返回 `Some`，否则返回 `None`。
    fn get(&self, name: &str) -> Option<String>;
}
