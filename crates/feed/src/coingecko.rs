use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::extract::error::ExtractError;
use sigflow_core::extract::port::Extractor;
use sigflow_core::metric::entity::RawRecord;
use sigflow_core::plugin::error::PluginError;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::http::{build_client, read_json};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PRO_KEY_HEADER: &str = "x-cg-pro-api-key";
// 免费档的安全请求间隔
const DEFAULT_MIN_INTERVAL_MS: u64 = 1500;
const DEFAULT_MAX_RETRIES: u64 = 3;
// 429 响应未携带 Retry-After 时的等待秒数
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// 进程内最近一次 CoinGecko 请求的发出时间，所有实例共享
static LAST_REQUEST: LazyLock<Mutex<Option<Instant>>> = LazyLock::new(|| Mutex::new(None));

/// # Summary
/// CoinGecko `simple/price` 抽取器。
///
/// # Invariants
/// - 返回完整的 `{coin_id: {...}}` 响应，保证其中包含目标币种。
/// - 限流 (最小请求间隔、429 重试) 完全在本抽取器内部处理；最小间隔跨实例生效。
pub struct CoinGeckoExtractor {
    client: Client,
    coin_id: String,
    vs_currency: String,
    api_key: Option<String>,
    min_interval: Duration,
    max_retries: u64,
}

impl CoinGeckoExtractor {
    /// # Summary
    /// 从参数映射构造抽取器。
    ///
    /// # Arguments
    /// * `params`: `coin_id` (默认 bitcoin)、`vs_currency` (默认 usd)、可选 `api_key`、
    ///   `min_interval_ms`、`max_retries`。
    pub fn from_params(params: &Params) -> Result<Self, PluginError> {
        let api_key = params
            .get_str("api_key")
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        let extractor = Self {
            client: build_client()?,
            coin_id: params.str_or("coin_id", "bitcoin").to_string(),
            vs_currency: params.str_or("vs_currency", "usd").to_string(),
            min_interval: Duration::from_millis(
                params
                    .get_u64("min_interval_ms")
                    .unwrap_or(DEFAULT_MIN_INTERVAL_MS),
            ),
            max_retries: params.get_u64("max_retries").unwrap_or(DEFAULT_MAX_RETRIES),
            api_key,
        };
        info!(
            coin_id = %extractor.coin_id,
            plan = if extractor.api_key.is_some() { "pro" } else { "free" },
            "CoinGecko extractor initialized"
        );
        Ok(extractor)
    }

    /// 保证与进程内上一次请求 (任意实例) 之间至少间隔 `min_interval`。
    async fn throttle(&self) {
        let mut last = LAST_REQUEST.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                info!("Rate limiting: sleeping for {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(format!("{}/simple/price", BASE_URL))
            .query(&[
                ("ids", self.coin_id.as_str()),
                ("vs_currencies", self.vs_currency.as_str()),
                ("include_market_cap", "true"),
                ("include_24hr_vol", "true"),
                ("include_24hr_change", "true"),
                ("include_last_updated_at", "true"),
            ]);
        if let Some(key) = &self.api_key {
            req = req.header(PRO_KEY_HEADER, key);
        }
        req
    }
}

/// # Summary
/// 校验响应中包含目标币种。
pub(crate) fn ensure_coin(data: &Value, coin_id: &str) -> Result<(), ExtractError> {
    match data.get(coin_id) {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(ExtractError::NotFound(format!(
            "coin `{}` missing from CoinGecko response",
            coin_id
        ))),
    }
}

/// 解析 Retry-After 秒数
pub(crate) fn retry_after(headers: &reqwest::header::HeaderMap) -> Duration {
    let secs = headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs)
}

#[async_trait]
impl Extractor for CoinGeckoExtractor {
    /// # Summary
    /// 抓取目标币种的价格、市值、成交量与 24h 涨跌幅。
    ///
    /// # Logic
    /// 1. 按最小间隔节流。
    /// 2. 收到 429 时按 Retry-After 等待后重试，最多 `max_retries` 次。
    /// 3. 校验响应包含目标币种。
    async fn fetch(&self) -> Result<RawRecord, ExtractError> {
        let mut attempt = 0;
        loop {
            self.throttle().await;
            info!(coin_id = %self.coin_id, attempt, "Requesting CoinGecko simple/price");

            let resp = self
                .request()
                .send()
                .await
                .map_err(|e| ExtractError::Network(e.to_string()))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.max_retries {
                    return Err(ExtractError::RateLimited(format!(
                        "CoinGecko still returning 429 after {} retries",
                        attempt
                    )));
                }
                let wait = retry_after(resp.headers());
                warn!("CoinGecko rate limit hit (429), waiting {:?} before retry", wait);
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            let data = read_json(resp).await?;
            ensure_coin(&data, &self.coin_id)?;
            return Ok(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use serde_json::json;

    #[test]
    fn test_ensure_coin() {
        let data = json!({"bitcoin": {"usd": 65000}});
        assert!(ensure_coin(&data, "bitcoin").is_ok());
        assert!(matches!(
            ensure_coin(&data, "ethereum"),
            Err(ExtractError::NotFound(_))
        ));
        assert!(ensure_coin(&json!({"bitcoin": 1}), "bitcoin").is_err());
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), Duration::from_secs(60));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(retry_after(&headers), Duration::from_secs(7));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&headers), Duration::from_secs(60));
    }

    #[test]
    fn test_from_params_defaults() {
        let ex = CoinGeckoExtractor::from_params(&Params::new()).unwrap();
        assert_eq!(ex.coin_id, "bitcoin");
        assert_eq!(ex.vs_currency, "usd");
        assert!(ex.api_key.is_none());
        assert_eq!(ex.min_interval, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_spacing_applies_across_instances() {
        let mut params = Params::new();
        params.insert("min_interval_ms".to_string(), json!(150));
        let first = CoinGeckoExtractor::from_params(&params).unwrap();
        let second = CoinGeckoExtractor::from_params(&params).unwrap();

        first.throttle().await;
        let started = Instant::now();
        second.throttle().await;
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
