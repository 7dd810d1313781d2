use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::error::{ProviderError, ProviderResult};

/// Builds the HTTP client shared by a provider, with the request timeout applied.
pub fn build_client(timeout: Duration) -> ProviderResult<Client> {
    Client::builder()
        .user_agent("commodity-tracker/0.1")
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Failure(format!("Failed to build HTTP client: {e}")))
}

fn request_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        debug!(error = %err, "Provider request failed");
        ProviderError::Failure("Provider request failed".to_string())
    }
}

/// Alpha Vantage reports throttling in a 200 body under `Note` or `Information`.
fn quota_notice(payload: &Value) -> Option<String> {
    ["Note", "Information"]
        .iter()
        .find_map(|field| payload.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

/// Fetches `url` and decodes the JSON body, classifying quota signals.
///
/// - HTTP 429 or a quota notice in the body is [`ProviderError::QuotaExceeded`]
/// - a client-side timeout is [`ProviderError::Timeout`]
/// - anything else that goes wrong is [`ProviderError::Failure`]
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: Url) -> ProviderResult<T> {
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::QuotaExceeded(
            "HTTP 429 from data provider".to_string(),
        ));
    }
    if !status.is_success() {
        return Err(ProviderError::Failure(format!(
            "Provider request failed with status {}",
            status.as_u16()
        )));
    }

    let body = response.text().await.map_err(request_error)?;
    let payload: Value = serde_json::from_str(&body)
        .map_err(|e| ProviderError::Failure(format!("Failed to parse provider response: {e}")))?;

    if let Some(notice) = quota_notice(&payload) {
        return Err(ProviderError::QuotaExceeded(notice));
    }

    serde_json::from_value(payload)
        .map_err(|e| ProviderError::Failure(format!("Unexpected provider response: {e}")))
}
