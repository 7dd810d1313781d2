use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::last_known::LastKnownGood;
use super::with_timeout;
use crate::core::cache::Cache;
use crate::core::config::{AppConfig, TrackedSymbol};
use crate::core::error::{ProviderError, ProviderResult};
use crate::core::market::{CandlePoint, ChartRange, HistoryResponse, ResponseMeta};
use crate::core::provider::HistoryProvider;
use crate::store::MemoryCache;

/// Number of daily points in a synthesized fallback series.
pub const FALLBACK_POINTS: usize = 60;

/// Builds a smooth daily series around `base_price`, ending the day before `now`.
///
/// The output depends only on the inputs, so the same base price and clock
/// always produce the same candles. Highs and lows only approximate a real
/// market.
pub fn synthesize_history(base_price: f64, now: DateTime<Utc>) -> Vec<CandlePoint> {
    (0..FALLBACK_POINTS)
        .map(|index| {
            let i = index as f64;
            let drift = (i / 8.0).sin() * base_price * 0.01;
            let close = base_price + drift;
            let open = close * (1.0 + (i / 4.0).sin() * 0.002);
            let days_back = (FALLBACK_POINTS - index) as i64;

            CandlePoint {
                time: (now - TimeDelta::days(days_back)).timestamp(),
                open,
                high: open.max(close) * 1.003,
                low: open.min(close) * 0.997,
                close,
                volume: 100_000.0 + i * 500.0,
            }
        })
        .collect()
}

/// Serves candle history, substituting a synthetic series while the provider
/// quota is exhausted.
pub struct HistoryService {
    provider: Arc<dyn HistoryProvider>,
    last_known: Arc<LastKnownGood>,
    cache: Arc<dyn Cache<String, HistoryResponse>>,
    ttl: Duration,
    request_timeout: Duration,
}

impl HistoryService {
    pub fn new(
        provider: Arc<dyn HistoryProvider>,
        last_known: Arc<LastKnownGood>,
        config: &AppConfig,
    ) -> Self {
        HistoryService {
            provider,
            last_known,
            cache: Arc::new(MemoryCache::new()),
            ttl: config.cache.history_ttl(),
            request_timeout: config.request_timeout(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache<String, HistoryResponse>>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the history for `symbol` over `range`.
    ///
    /// Quota exhaustion yields a synthesized, stale response; any other provider
    /// failure is returned to the caller.
    pub async fn history(
        &self,
        symbol: &TrackedSymbol,
        range: ChartRange,
    ) -> ProviderResult<HistoryResponse> {
        let key = format!("{}:{}", symbol.symbol, range);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let result = with_timeout(
            self.request_timeout,
            self.provider.fetch_history(symbol, range),
        )
        .await;

        let response = match result {
            Ok(data) => HistoryResponse {
                symbol: symbol.symbol.clone(),
                range,
                data,
                meta: ResponseMeta::live(),
            },
            Err(ProviderError::QuotaExceeded(message)) => {
                let base_price = match self.last_known.get(&symbol.symbol).await {
                    Some(quote) => quote.price,
                    None => symbol.seed_price,
                };
                warn!(
                    symbol = %symbol.symbol,
                    %range,
                    base_price,
                    %message,
                    "History quota exhausted, serving synthesized series"
                );
                HistoryResponse {
                    symbol: symbol.symbol.clone(),
                    range,
                    data: synthesize_history(base_price, Utc::now()),
                    meta: ResponseMeta::quota_exhausted(message),
                }
            }
            Err(e) => return Err(e),
        };

        info!(
            symbol = %symbol.symbol,
            %range,
            points = response.data.len(),
            stale = response.meta.stale,
            "Built history response"
        );
        self.cache.put(key, response.clone(), self.ttl).await;
        Ok(response)
    }
}
