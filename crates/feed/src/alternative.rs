//! Alternative.me 的恐惧贪婪指数与全市场概览。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::extract::error::ExtractError;
use sigflow_core::extract::port::Extractor;
use sigflow_core::metric::entity::RawRecord;
use sigflow_core::plugin::error::PluginError;
use tracing::info;

use crate::http::{build_client, send_json};

const BASE_URL: &str = "https://api.alternative.me";

/// # Summary
/// 恐惧贪婪指数抽取器 (`fng/?limit=1`)。
pub struct FearGreedExtractor {
    client: Client,
    limit: u64,
}

impl FearGreedExtractor {
    pub fn from_params(params: &Params) -> Result<Self, PluginError> {
        Ok(Self {
            client: build_client()?,
            limit: params.get_u64("limit").unwrap_or(1).max(1),
        })
    }
}

#[async_trait]
impl Extractor for FearGreedExtractor {
    async fn fetch(&self) -> Result<RawRecord, ExtractError> {
        info!("Requesting Alternative.me fear & greed index");
        let limit = self.limit.to_string();
        let data = send_json(
            self.client
                .get(format!("{}/fng/", BASE_URL))
                .query(&[("limit", limit.as_str())]),
        )
        .await?;
        require_data(data)
    }
}

/// # Summary
/// 全市场概览抽取器 (`v2/global/`)。
pub struct GlobalMarketExtractor {
    client: Client,
}

impl GlobalMarketExtractor {
    pub fn from_params(_params: &Params) -> Result<Self, PluginError> {
        Ok(Self {
            client: build_client()?,
        })
    }
}

#[async_trait]
impl Extractor for GlobalMarketExtractor {
    async fn fetch(&self) -> Result<RawRecord, ExtractError> {
        info!("Requesting Alternative.me global market data");
        let data = send_json(self.client.get(format!("{}/v2/global/", BASE_URL))).await?;
        require_data(data)
    }
}

/// 两个接口都把有效载荷放在 `data` 字段下
fn require_data(data: Value) -> Result<Value, ExtractError> {
    match data.get("data") {
        Some(v) if !v.is_null() => Ok(data),
        _ => Err(ExtractError::Parse(
            "Alternative.me response has no `data` field".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_data() {
        assert!(require_data(json!({"data": [{"value": "40"}]})).is_ok());
        assert!(require_data(json!({"data": null})).is_err());
        assert!(require_data(json!({"metadata": {}})).is_err());
    }
}
