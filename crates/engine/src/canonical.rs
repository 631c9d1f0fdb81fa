//! 抽取缓存键的规范化序列化。
//!
//! 规则：映射按键排序，列表保持顺序，标量原样输出，字符串带长度前缀。
//! 结果与参数插入顺序无关，且不同结构不会产生相同字节串。

use serde_json::Value;
use sha2::{Digest, Sha256};
use sigflow_core::cache::error::CacheKeyError;
use sigflow_core::common::Params;
use std::fmt::Write;

/// 规范化允许的最大嵌套层数
pub const MAX_DEPTH: usize = 32;

/// # Summary
/// 抽取结果的缓存键：(抽取器身份, 规范化参数) 的字节串及其 SHA-256 摘要。
///
/// # Invariants
/// - 相同身份与语义相同的参数 (忽略映射键顺序) 必然得到相同的键。
/// - 摘要为 64 位小写十六进制，用作缓存槽名。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    canonical: String,
    digest: String,
}

impl CacheKey {
    /// # Summary
    /// 构造缓存键。
    ///
    /// # Logic
    /// 1. 写入身份字符串。
    /// 2. 递归规范化参数映射。
    /// 3. 对完整字节串取 SHA-256。
    ///
    /// # Arguments
    /// * `identity`: 符号名或 `module::class`。
    /// * `params`: 最终传给抽取器的参数。
    ///
    /// # Returns
    /// 嵌套超过 `MAX_DEPTH` 返回 `CacheKeyError::TooDeep`。
    pub fn build(identity: &str, params: &Params) -> Result<Self, CacheKeyError> {
        let mut canonical = String::new();
        write_str(&mut canonical, identity);
        canonical.push('|');
        write_map(&mut canonical, params, 1)?;

        let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
        Ok(Self { canonical, digest })
    }

    /// 规范化字节串
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// 缓存槽名
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

fn write_str(out: &mut String, s: &str) {
    // 长度前缀使任何字符串内容都不会与分隔符混淆
    out.push('s');
    out.push_str(&s.len().to_string());
    out.push(':');
    out.push_str(s);
}

fn write_map(
    out: &mut String,
    map: &serde_json::Map<String, Value>,
    depth: usize,
) -> Result<(), CacheKeyError> {
    if depth > MAX_DEPTH {
        return Err(CacheKeyError::TooDeep { limit: MAX_DEPTH });
    }
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (key, value) in entries {
        write_str(out, key);
        out.push('=');
        write_value(out, value, depth + 1)?;
        out.push(';');
    }
    out.push('}');
    Ok(())
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<(), CacheKeyError> {
    match value {
        Value::Null => out.push('n'),
        Value::Bool(b) => out.push_str(if *b { "t" } else { "f" }),
        Value::Number(n) => {
            if write!(out, "#{};", n).is_err() {
                out.push_str("#?;");
            }
        }
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            if depth > MAX_DEPTH {
                return Err(CacheKeyError::TooDeep { limit: MAX_DEPTH });
            }
            out.push('[');
            for item in items {
                write_value(out, item, depth + 1)?;
                out.push(',');
            }
            out.push(']');
        }
        Value::Object(map) => write_map(out, map, depth)?,
    }
    Ok(())
}
