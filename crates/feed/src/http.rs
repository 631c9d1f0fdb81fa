use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use sigflow_core::extract::error::ExtractError;
use sigflow_core::plugin::error::PluginError;
use std::sync::Once;
use std::time::Duration;
use tracing::debug;

/// 请求超时
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 伪装浏览器的 User-Agent，减少被拦截风险
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static CRYPTO_PROVIDER: Once = Once::new();

/// # Summary
/// 构建抽取器共用的 HTTP 客户端。
///
/// # Logic
/// 1. 首次调用时安装 rustls 的 ring 加密后端。
/// 2. 配置 10 秒超时与默认 User-Agent。
///
/// # Returns
/// 成功返回 `Client`，构建失败返回 `PluginError::Construction`。
pub(crate) fn build_client() -> Result<Client, PluginError> {
    CRYPTO_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }
    });

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));

    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .default_headers(headers)
        .build()
        .map_err(|e| PluginError::Construction(format!("HTTP client: {}", e)))
}

/// # Summary
/// 发送请求并把成功响应解析为 JSON。
///
/// # Logic
/// 1. 网络失败映射为 `ExtractError::Network`。
/// 2. 非 2xx 状态映射为 `ExtractError::Http`，携带响应体。
/// 3. 响应体不是合法 JSON 映射为 `ExtractError::Parse`。
pub(crate) async fn send_json(request: RequestBuilder) -> Result<Value, ExtractError> {
    let resp = request
        .send()
        .await
        .map_err(|e| ExtractError::Network(e.to_string()))?;
    read_json(resp).await
}

/// 校验状态码并解析已收到的响应。
pub(crate) async fn read_json(resp: Response) -> Result<Value, ExtractError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ExtractError::Http {
            status: status.as_u16(),
            body,
        });
    }

    resp.json::<Value>()
        .await
        .map_err(|e| ExtractError::Parse(e.to_string()))
}
