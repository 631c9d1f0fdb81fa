use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};
use sigflow_core::common::Params;
use sigflow_core::common::time::{FakeClockProvider, TimeProvider};
use sigflow_core::plugin::error::PluginError;
use sigflow_core::plugin::port::PluginFactory;
use sigflow_transform::{TransformKind, TransformModule};
use std::sync::Arc;

fn params(v: Value) -> Params {
    match v {
        Value::Object(m) => m,
        _ => Params::new(),
    }
}

fn fixed_clock() -> Arc<dyn TimeProvider> {
    Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap(),
    ))
}

/// # Summary
/// 每个内置转换器都能按符号名与类名互查。
#[test]
fn test_kind_lookup_roundtrip() {
    for kind in TransformKind::ALL {
        assert_eq!(TransformKind::from_name(kind.name()), Some(kind));
        assert_eq!(TransformKind::from_class(kind.class()), Some(kind));
    }
}

/// # Summary
/// 同一份 CoinGecko 响应派生四个信号。
#[test]
fn test_coingecko_family_on_one_payload() -> anyhow::Result<()> {
    let raw = json!({"bitcoin": {
        "usd": 65000,
        "usd_market_cap": 1.28e12,
        "usd_24h_vol": 3.1e10,
        "usd_24h_change": 1.75
    }});
    let expected = [
        (TransformKind::BitcoinPrice, 65000.0, "USD"),
        (TransformKind::BitcoinMarketCap, 1.28e12, "USD"),
        (TransformKind::Bitcoin24hVolume, 3.1e10, "USD"),
        (TransformKind::Bitcoin24hChange, 1.75, "percentage"),
    ];
    for (kind, value, units) in expected {
        let m = kind
            .build_with_clock(&Params::new(), fixed_clock())?
            .transform(&raw)?;
        assert_eq!(m.value, value, "{}", kind.name());
        assert_eq!(m.units, units);
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }
    Ok(())
}

/// # Summary
/// `coin_id` 参数切换信封键。
#[test]
fn test_coin_id_param() -> anyhow::Result<()> {
    let t = TransformKind::BitcoinPrice
        .build_with_clock(&params(json!({"coin_id": "ethereum"})), fixed_clock())?;
    let m = t.transform(&json!({"ethereum": {"usd": 3500.5}}))?;
    assert_eq!(m.value, 3500.5);
    Ok(())
}

/// # Summary
/// 模块工厂按类名构造，未知类名返回 UnknownClass。
#[test]
fn test_module_factory() -> anyhow::Result<()> {
    let t = TransformModule.transformer("KeyTransformer", &params(json!({"key": "usd"})))?;
    assert_eq!(t.transform(&json!({"usd": 10}))?.units, "USD");

    assert!(matches!(
        TransformModule.transformer("Nope", &Params::new()),
        Err(PluginError::UnknownClass { .. })
    ));
    assert!(matches!(
        TransformModule.transformer("KeyTransformer", &Params::new()),
        Err(PluginError::InvalidParams(_))
    ));
    Ok(())
}
