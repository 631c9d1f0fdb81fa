//! `{{NAME}}` / `${NAME}` 模板解析。
//!
//! 只替换字符串值，不处理映射的键。无法解析的引用原样保留并报告给调用方。

use serde_json::Value;

/// 模板中的一个占位符
struct Placeholder<'a> {
    // 占位符在原串中的起止字节位置
    start: usize,
    end: usize,
    // 变量名 (已去除首尾空白)
    name: &'a str,
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 在 `s` 中查找下一个合法占位符。
fn next_placeholder(s: &str) -> Option<Placeholder<'_>> {
    let mut search_from = 0;
    while search_from < s.len() {
        let tail = &s[search_from..];
        let (offset, open, close) = match (tail.find("{{"), tail.find("${")) {
            (None, None) => return None,
            (Some(b), None) => (b, "{{", "}}"),
            (None, Some(d)) => (d, "${", "}"),
            (Some(b), Some(d)) if b <= d => (b, "{{", "}}"),
            (Some(_), Some(d)) => (d, "${", "}"),
        };
        let start = search_from + offset;
        let body_start = start + open.len();
        if let Some(close_rel) = s[body_start..].find(close) {
            let name = s[body_start..body_start + close_rel].trim();
            if is_valid_name(name) {
                return Some(Placeholder {
                    start,
                    end: body_start + close_rel + close.len(),
                    name,
                });
            }
        }
        search_from = body_start;
    }
    None
}

/// # Summary
/// 解析单个字符串中的全部占位符。
///
/// # Logic
/// 1. 自左向右扫描 `{{NAME}}` 与 `${NAME}`。
/// 2. `lookup` 命中则替换为变量值。
/// 3. 未命中则保留原文，并把变量名追加到 `unresolved`。
///
/// # Arguments
/// * `input`: 原始字符串。
/// * `lookup`: 变量查询函数，生产环境为进程环境变量。
/// * `unresolved`: 未解析变量名的收集器。
///
/// # Returns
/// 替换后的新字符串。
pub fn resolve_str<F>(input: &str, lookup: &F, unresolved: &mut Vec<String>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(p) = next_placeholder(rest) {
        out.push_str(&rest[..p.start]);
        match lookup(p.name) {
            Some(v) => out.push_str(&v),
            None => {
                out.push_str(&rest[p.start..p.end]);
                unresolved.push(p.name.to_string());
            }
        }
        rest = &rest[p.end..];
    }
    out.push_str(rest);
    out
}

/// # Summary
/// 递归解析 JSON 树中所有字符串值。
///
/// # Returns
/// 未能解析的变量名列表 (按出现顺序，可能重复)。
pub fn resolve_value<F>(value: &mut Value, lookup: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut unresolved = Vec::new();
    walk(value, lookup, &mut unresolved);
    unresolved
}

fn walk<F>(value: &mut Value, lookup: &F, unresolved: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => {
            let resolved = resolve_str(s, lookup, unresolved);
            *s = resolved;
        }
        Value::Array(items) => {
            for item in items {
                walk(item, lookup, unresolved);
            }
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                walk(v, lookup, unresolved);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(name: &str) -> Option<String> {
        match name {
            "FRED_API_KEY" => Some("abc123".to_string()),
            "HOST" => Some("db.local".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_both_syntaxes_resolve() {
        let mut miss = Vec::new();
        let out = resolve_str("key={{FRED_API_KEY}}&host=${HOST}", &env, &mut miss);
        assert_eq!(out, "key=abc123&host=db.local");
        assert!(miss.is_empty());
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let mut miss = Vec::new();
        assert_eq!(resolve_str("{{ HOST }}", &env, &mut miss), "db.local");
    }

    #[test]
    fn test_unresolved_left_verbatim() {
        let mut miss = Vec::new();
        let out = resolve_str("a-{{NOPE}}-${ALSO_NOPE}-b", &env, &mut miss);
        assert_eq!(out, "a-{{NOPE}}-${ALSO_NOPE}-b");
        assert_eq!(miss, vec!["NOPE".to_string(), "ALSO_NOPE".to_string()]);
    }

    #[test]
    fn test_malformed_placeholders_untouched() {
        let mut miss = Vec::new();
        assert_eq!(resolve_str("{{HOST", &env, &mut miss), "{{HOST");
        assert_eq!(resolve_str("${}", &env, &mut miss), "${}");
        assert_eq!(resolve_str("{{bad name}}", &env, &mut miss), "{{bad name}}");
        assert!(miss.is_empty());
    }

    #[test]
    fn test_resolve_value_nested() {
        let mut v = json!({
            "extractor_params": {"api_key": "{{FRED_API_KEY}}", "ids": ["${HOST}", 3]},
            "flag": true,
            "missing": "${UNSET_VAR}"
        });
        let miss = resolve_value(&mut v, &env);
        assert_eq!(v["extractor_params"]["api_key"], json!("abc123"));
        assert_eq!(v["extractor_params"]["ids"], json!(["db.local", 3]));
        assert_eq!(v["flag"], json!(true));
        assert_eq!(v["missing"], json!("${UNSET_VAR}"));
        assert_eq!(miss, vec!["UNSET_VAR".to_string()]);
    }
}
