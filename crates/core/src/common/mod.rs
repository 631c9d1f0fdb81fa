pub mod time;

use serde_json::{Map, Value};

/// # Summary
/// 插件参数映射。值域限定为 JSON 的封闭类型集合
/// (字符串、数字、布尔、空值、有序列表、映射)。
///
/// # Invariants
/// - 启用 `preserve_order` 后保持配置文件中的书写顺序，但任何依赖参数的
///   指纹计算都不得依赖该顺序。
pub type Params = Map<String, Value>;

/// # Summary
/// `Params` 的便捷读取扩展，供各插件构造函数使用。
pub trait ParamsExt {
    /// 读取字符串参数，非字符串或缺失时返回 None。
    fn get_str(&self, key: &str) -> Option<&str>;

    /// 读取字符串参数，缺失时回退到默认值。
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str;

    /// 读取无符号整数参数。
    fn get_u64(&self, key: &str) -> Option<u64>;

    /// 读取浮点参数，整数值同样接受。
    fn get_f64(&self, key: &str) -> Option<f64>;
}

impl ParamsExt for Params {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }
}

/// # Summary
/// 合并多层参数，靠后的层级覆盖靠前层级的同名键。
///
/// # Arguments
/// * `layers`: 由低到高优先级排列的参数层。
///
/// # Returns
/// 合并后的新映射。
pub fn merge_params<'a, I>(layers: I) -> Params
where
    I: IntoIterator<Item = &'a Params>,
{
    let mut merged = Params::new();
    for layer in layers {
        for (k, v) in layer {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}
