use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::with_timeout;
use crate::core::cache::Cache;
use crate::core::config::{AppConfig, TrackedSymbol};
use crate::core::error::{ProviderError, ProviderResult};
use crate::core::market::{NewsResponse, ResponseMeta};
use crate::core::provider::HeadlineProvider;
use crate::store::MemoryCache;

pub struct NewsService {
    provider: Arc<dyn HeadlineProvider>,
    cache: Arc<dyn Cache<String, NewsResponse>>,
    ttl: Duration,
    request_timeout: Duration,
}

impl NewsService {
    pub fn new(provider: Arc<dyn HeadlineProvider>, config: &AppConfig) -> Self {
        NewsService {
            provider,
            cache: Arc::new(MemoryCache::new()),
            ttl: config.cache.news_ttl(),
            request_timeout: config.request_timeout(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache<String, NewsResponse>>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns headlines for `symbol`. Under quota exhaustion the result is an
    /// empty, stale list; there is no stand-in for real news.
    pub async fn news(&self, symbol: &TrackedSymbol) -> ProviderResult<NewsResponse> {
        let key = format!("news:{}", symbol.symbol);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let result = with_timeout(self.request_timeout, self.provider.fetch_headlines(symbol)).await;
        let response = match result {
            Ok(data) => NewsResponse {
                data,
                meta: ResponseMeta::live(),
            },
            Err(ProviderError::QuotaExceeded(message)) => {
                warn!(symbol = %symbol.symbol, %message, "News quota exhausted");
                NewsResponse {
                    data: Vec::new(),
                    meta: ResponseMeta::quota_exhausted(message),
                }
            }
            Err(e) => return Err(e),
        };

        debug!(
            symbol = %symbol.symbol,
            headlines = response.data.len(),
            "Caching news response"
        );
        self.cache.put(key, response.clone(), self.ttl).await;
        Ok(response)
    }
}
