use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::extract::error::ExtractError;
use sigflow_core::extract::port::Extractor;
use sigflow_core::metric::entity::RawRecord;
use sigflow_core::plugin::error::PluginError;
use tracing::info;

use crate::http::{build_client, send_json};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// # Summary
/// Yahoo Finance v8 chart 抽取器。
///
/// # Invariants
/// - 返回按时间升序排列的 K 线 JSON 列表，缺少 OHLCV 任一字段的点被跳过。
pub struct YahooExtractor {
    /// 内部使用的 HTTP 客户端
    client: Client,
    symbol: String,
    interval: String,
    range: String,
}

impl YahooExtractor {
    /// # Summary
    /// 从参数映射构造抽取器。
    ///
    /// # Arguments
    /// * `params`: `symbol` (必填)、`interval` (默认 `1d`)、`range` (默认 `5d`)。
    ///
    /// # Returns
    /// 缺少 `symbol` 返回 `PluginError::InvalidParams`。
    pub fn from_params(params: &Params) -> Result<Self, PluginError> {
        let symbol = params
            .get_str("symbol")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PluginError::InvalidParams("yahoo_extractor requires `symbol`".into()))?;
        Ok(Self {
            client: build_client()?,
            symbol: symbol.to_string(),
            interval: params.str_or("interval", "1d").to_string(),
            range: params.str_or("range", "5d").to_string(),
        })
    }
}

/// # Summary
/// 单根 K 线，作为抽取结果的元素。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: f64,
}

/// # Summary
/// Yahoo API 响应顶层结构。
///
/// # Invariants
/// - 映射自 Yahoo v8 chart 接口。
#[derive(Deserialize, Debug)]
pub(crate) struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Deserialize, Debug)]
struct YahooError {
    description: String,
}

/// Yahoo API 单个时间序列结果
#[derive(Deserialize, Debug)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
    // 调整后的价格数据
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Deserialize, Debug)]
struct YahooAdjClose {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo API 原始报价数据，各列表与 timestamp 等长
#[derive(Deserialize, Debug)]
struct YahooQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// # Summary
/// 把 chart 响应解析为 K 线列表。
///
/// # Logic
/// 1. 接口返回 `error` 时转为 `ExtractError::NotFound`。
/// 2. 取最后一个结果的第一组报价。
/// 3. 合并 adjclose，跳过任一 OHLCV 缺失的点。
pub(crate) fn parse_chart(resp: YahooResponse) -> Result<Vec<Candle>, ExtractError> {
    if let Some(err) = resp.chart.error {
        return Err(ExtractError::NotFound(err.description));
    }

    let result = resp
        .chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| ExtractError::NotFound("empty chart result".into()))?;

    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| ExtractError::Parse("No quote data".into()))?;

    let adj_close_list = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|v| v.first())
        .map(|v| &v.adjclose);

    let mut candles = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(time) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };
        if let (Some(o), Some(h), Some(l), Some(c), Some(v)) = (
            quote.open.get(i).and_then(|x| *x),
            quote.high.get(i).and_then(|x| *x),
            quote.low.get(i).and_then(|x| *x),
            quote.close.get(i).and_then(|x| *x),
            quote.volume.get(i).and_then(|x| *x),
        ) {
            candles.push(Candle {
                time,
                open: o,
                high: h,
                low: l,
                close: c,
                adj_close: adj_close_list.and_then(|list| list.get(i)).and_then(|x| *x),
                volume: v,
            });
        }
    }

    Ok(candles)
}

#[async_trait]
impl Extractor for YahooExtractor {
    /// # Summary
    /// 抓取 `symbol` 在 `range` 区间内的 K 线。
    ///
    /// # Returns
    /// 成功返回 K 线 JSON 列表；没有任何完整 K 线时返回 `ExtractError::NotFound`。
    async fn fetch(&self) -> Result<RawRecord, ExtractError> {
        info!(symbol = %self.symbol, interval = %self.interval, range = %self.range, "Requesting Yahoo chart");
        let raw = send_json(
            self.client
                .get(format!("{}/{}", CHART_URL, self.symbol))
                .query(&[
                    ("interval", self.interval.as_str()),
                    ("range", self.range.as_str()),
                ]),
        )
        .await?;

        let resp: YahooResponse =
            serde_json::from_value(raw).map_err(|e| ExtractError::Parse(e.to_string()))?;
        let candles = parse_chart(resp)?;
        if candles.is_empty() {
            return Err(ExtractError::NotFound(format!(
                "no complete candles for {}",
                self.symbol
            )));
        }
        serde_json::to_value(candles).map_err(|e| ExtractError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "chart": {
                "result": [{
                    "timestamp": [1_700_000_000, 1_700_086_400, 1_700_172_800],
                    "indicators": {
                        "quote": [{
                            "open":   [1.0, 2.0, null],
                            "high":   [1.5, 2.5, 3.5],
                            "low":    [0.5, 1.5, 2.5],
                            "close":  [1.2, 2.2, 3.2],
                            "volume": [100.0, 200.0, 300.0]
                        }],
                        "adjclose": [{"adjclose": [1.1, null, 3.1]}]
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn test_parse_chart_skips_incomplete_points() {
        let resp: YahooResponse = serde_json::from_value(sample()).unwrap();
        let candles = parse_chart(resp).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].adj_close, Some(1.1));
        assert_eq!(candles[1].adj_close, None);
        assert_eq!(candles[1].close, 2.2);
    }

    #[test]
    fn test_parse_chart_error_payload() {
        let resp: YahooResponse = serde_json::from_value(json!({
            "chart": {"result": null, "error": {"description": "No data found, symbol may be delisted"}}
        }))
        .unwrap();
        assert!(matches!(parse_chart(resp), Err(ExtractError::NotFound(_))));
    }

    #[test]
    fn test_symbol_required() {
        assert!(matches!(
            YahooExtractor::from_params(&Params::new()),
            Err(PluginError::InvalidParams(_))
        ));
    }
}
