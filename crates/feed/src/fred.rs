use async_trait::async_trait;
use reqwest::Client;
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::extract::error::ExtractError;
use sigflow_core::extract::port::Extractor;
use sigflow_core::metric::entity::RawRecord;
use sigflow_core::plugin::error::PluginError;
use tracing::{info, warn};

use crate::http::{build_client, send_json};

const BASE_URL: &str = "https://api.stlouisfed.org/fred";
/// M2 货币供应量 (月度)
pub const DEFAULT_SERIES_ID: &str = "MANMM101XXM189S";
const DEFAULT_LIMIT: u64 = 12;

/// # Summary
/// FRED `series/observations` 抽取器。
///
/// # Invariants
/// - 缺少 `api_key` 时仍可构造，`fetch` 返回 `ExtractError::Auth`。
pub struct FredExtractor {
    client: Client,
    series_id: String,
    api_key: Option<String>,
    limit: u64,
}

impl FredExtractor {
    /// # Summary
    /// 从参数映射构造抽取器。
    ///
    /// # Arguments
    /// * `params`: `series_id`、`api_key`、`limit` (最近若干条观测值)。
    pub fn from_params(params: &Params) -> Result<Self, PluginError> {
        let api_key = params
            .get_str("api_key")
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        if api_key.is_none() {
            warn!("FRED extractor constructed without api_key; fetch will fail");
        }
        Ok(Self {
            client: build_client()?,
            series_id: params.str_or("series_id", DEFAULT_SERIES_ID).to_string(),
            limit: params.get_u64("limit").unwrap_or(DEFAULT_LIMIT),
            api_key,
        })
    }
}

#[async_trait]
impl Extractor for FredExtractor {
    async fn fetch(&self) -> Result<RawRecord, ExtractError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ExtractError::Auth(format!(
                "FRED api_key missing for series {}",
                self.series_id
            )));
        };

        info!(series_id = %self.series_id, "Requesting FRED observations");
        let limit = self.limit.to_string();
        let data = send_json(
            self.client
                .get(format!("{}/series/observations", BASE_URL))
                .query(&[
                    ("series_id", self.series_id.as_str()),
                    ("api_key", api_key),
                    ("file_type", "json"),
                    ("sort_order", "desc"),
                    ("limit", limit.as_str()),
                ]),
        )
        .await?;

        if !data.get("observations").is_some_and(|o| o.is_array()) {
            return Err(ExtractError::Parse(
                "FRED response has no `observations` list".to_string(),
            ));
        }
        Ok(data)
    }
}
