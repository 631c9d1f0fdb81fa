use sigflow_core::config::error::ConfigError;
use sigflow_core::secrets::port::SecretStore;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// # Summary
/// 读取进程环境变量的密钥库。`.env` 由应用入口预先载入。
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// # Summary
/// 固定内容的密钥库。
#[derive(Debug, Default, Clone)]
pub struct StaticSecretStore {
    values: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl SecretStore for StaticSecretStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

/// 宽松模式的解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSecrets {
    pub values: BTreeMap<String, String>,
    // 按请求顺序排列的缺失密钥名
    pub missing: Vec<String>,
}

/// # Summary
/// 按名称批量解析密钥。
#[derive(Clone)]
pub struct SecretsResolver {
    store: Arc<dyn SecretStore>,
}

impl SecretsResolver {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// # Summary
    /// 严格模式：任一密钥缺失或为空立即失败。
    ///
    /// # Returns
    /// 全部存在返回 名称 -> 值；否则返回第一个缺失项的 `ConfigError::MissingSecret`。
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut values = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            let value = self
                .store
                .get(name)
                .ok_or_else(|| ConfigError::MissingSecret(name.to_string()))?;
            values.insert(name.to_string(), value);
        }
        Ok(values)
    }

    /// # Summary
    /// 宽松模式：收集存在的值与缺失的名称，不报错。
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> ResolvedSecrets {
        let mut resolved = ResolvedSecrets::default();
        for name in names {
            let name = name.as_ref();
            match self.store.get(name) {
                Some(v) => {
                    resolved.values.insert(name.to_string(), v);
                }
                None => {
                    if !resolved.missing.iter().any(|m| m == name) {
                        resolved.missing.push(name.to_string());
                    }
                }
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SecretsResolver {
        SecretsResolver::new(Arc::new(
            StaticSecretStore::new()
                .with("FRED_API_KEY", "abc")
                .with("EMPTY", ""),
        ))
    }

    #[test]
    fn test_require_fails_fast() {
        let r = resolver();
        assert_eq!(
            r.require(&["FRED_API_KEY"]).unwrap().get("FRED_API_KEY").map(String::as_str),
            Some("abc")
        );
        let err = r.require(&["FRED_API_KEY", "EMPTY", "NOPE"]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(name) if name == "EMPTY"));
    }

    #[test]
    fn test_resolve_is_lenient() {
        let resolved = resolver().resolve(&["NOPE", "FRED_API_KEY", "NOPE"]);
        assert_eq!(resolved.values.len(), 1);
        assert_eq!(resolved.missing, vec!["NOPE".to_string()]);
    }
}
