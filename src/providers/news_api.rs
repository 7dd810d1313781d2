use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::http::{build_client, fetch_json};
use crate::core::config::{ProviderEndpoint, TrackedSymbol};
use crate::core::error::{ProviderError, ProviderResult};
use crate::core::market::Headline;
use crate::core::provider::HeadlineProvider;

const PAGE_SIZE: &str = "15";

#[derive(Deserialize, Debug)]
struct NewsApiPayload {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize, Debug)]
struct Article {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Deserialize, Debug)]
struct ArticleSource {
    name: Option<String>,
}

/// Headlines from the NewsAPI `everything` endpoint.
pub struct NewsApiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl NewsApiProvider {
    pub fn new(endpoint: &ProviderEndpoint, timeout: Duration) -> ProviderResult<Self> {
        Ok(NewsApiProvider {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key: endpoint.api_key.clone(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl HeadlineProvider for NewsApiProvider {
    #[instrument(name = "NewsApiFetch", skip(self, symbol), fields(symbol = %symbol.symbol))]
    async fn fetch_headlines(&self, symbol: &TrackedSymbol) -> ProviderResult<Vec<Headline>> {
        let url = Url::parse_with_params(
            &format!("{}/v2/everything", self.base_url),
            &[
                ("q", symbol.news_query.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", PAGE_SIZE),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Failure(format!("Invalid NewsAPI URL: {e}")))?;

        let payload: NewsApiPayload = fetch_json(&self.client, url).await?;

        if payload.status == "error" {
            return Err(match payload.code.as_deref() {
                Some("rateLimited") => ProviderError::QuotaExceeded(
                    payload
                        .message
                        .unwrap_or_else(|| "News quota exhausted".to_string()),
                ),
                _ => ProviderError::Failure(
                    payload
                        .message
                        .unwrap_or_else(|| "News provider failed".to_string()),
                ),
            });
        }

        let headlines: Vec<Headline> = payload
            .articles
            .into_iter()
            .filter_map(|article| {
                let url = article.url?;
                let published_at = DateTime::parse_from_rfc3339(article.published_at.as_deref()?)
                    .ok()?
                    .with_timezone(&Utc);
                Some(Headline {
                    id: Headline::headline_id(&symbol.symbol, &url),
                    title: article.title?,
                    source: article
                        .source
                        .and_then(|source| source.name)
                        .unwrap_or_default(),
                    published_at,
                    url,
                    symbol: symbol.symbol.clone(),
                })
            })
            .collect();

        debug!("Received {} headlines", headlines.len());
        Ok(headlines)
    }
}
