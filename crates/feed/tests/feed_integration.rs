use serde_json::{Value, json};
use sigflow_core::common::Params;
use sigflow_core::extract::error::ExtractError;
use sigflow_core::extract::port::Extractor;
use sigflow_core::test_utils::MockExtractor;
use sigflow_feed::snapshot::SnapshotExtractor;
use sigflow_feed::{FeedKind, FeedModule};
use sigflow_core::plugin::port::PluginFactory;

fn params(v: Value) -> Params {
    match v {
        Value::Object(m) => m,
        _ => Params::new(),
    }
}

/// # Summary
/// 快照装饰器把原始记录写成格式化 JSON，且不改变返回值。
#[tokio::test]
async fn test_snapshot_writes_raw_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("raw.json");
    let record = json!({"bitcoin": {"usd": 65000}});

    let ex = SnapshotExtractor::new(Box::new(MockExtractor::returning(record.clone())), &path);
    let fetched = ex.fetch().await?;
    assert_eq!(fetched, record);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(written, record);
    Ok(())
}

/// # Summary
/// 快照写入失败只告警，抓取仍然成功。
#[tokio::test]
async fn test_snapshot_write_failure_is_not_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // 目标路径是一个目录，写文件必然失败
    let ex = SnapshotExtractor::new(
        Box::new(MockExtractor::returning(json!({"ok": true}))),
        dir.path(),
    );
    assert_eq!(ex.fetch().await?, json!({"ok": true}));
    Ok(())
}

/// # Summary
/// 内层抓取失败时不写快照。
#[tokio::test]
async fn test_snapshot_skipped_on_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("raw.json");
    let ex = SnapshotExtractor::new(Box::new(MockExtractor::failing()), &path);
    assert!(matches!(ex.fetch().await, Err(ExtractError::Network(_))));
    assert!(!path.exists());
    Ok(())
}

/// # Summary
/// 模块工厂与符号名构造同一种抽取器；FRED 缺少密钥在抓取时报认证错误。
#[tokio::test]
async fn test_fred_via_module_without_key() -> anyhow::Result<()> {
    let ex = FeedModule.extractor("FredExtractor", &params(json!({"series_id": "M2SL"})))?;
    assert!(matches!(ex.fetch().await, Err(ExtractError::Auth(_))));

    let ex = FeedKind::Fred.build(&Params::new())?;
    assert!(matches!(ex.fetch().await, Err(ExtractError::Auth(_))));
    Ok(())
}

/// # Summary
/// 真实请求 CoinGecko，需要网络。
#[tokio::test]
#[ignore]
async fn test_coingecko_real_fetch() -> anyhow::Result<()> {
    let ex = FeedKind::CoinGecko.build(&Params::new())?;
    let raw = ex.fetch().await?;
    assert!(raw["bitcoin"]["usd"].is_number());
    Ok(())
}

/// # Summary
/// 真实请求 Alternative.me，需要网络。
#[tokio::test]
#[ignore]
async fn test_alternative_real_fetch() -> anyhow::Result<()> {
    let raw = FeedKind::FearGreed.build(&Params::new())?.fetch().await?;
    assert!(raw["data"].is_array());
    let raw = FeedKind::GlobalMarket.build(&Params::new())?.fetch().await?;
    assert!(raw["data"].is_object());
    Ok(())
}

/// # Summary
/// 真实请求 Yahoo Finance，需要网络。
#[tokio::test]
#[ignore]
async fn test_yahoo_real_fetch() -> anyhow::Result<()> {
    let ex = FeedKind::Yahoo.build(&params(json!({"symbol": "AAPL", "range": "5d"})))?;
    let raw = ex.fetch().await?;
    let candles = raw.as_array().map(Vec::len).unwrap_or(0);
    assert!(candles > 0, "expected at least one candle");
    Ok(())
}
