use chrono::Utc;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::last_known::LastKnownGood;
use super::with_timeout;
use crate::core::cache::Cache;
use crate::core::config::{AppConfig, TrackedSymbol};
use crate::core::error::{ProviderError, ProviderResult};
use crate::core::market::{DataSource, Quote, ResponseMeta, SnapshotResponse};
use crate::core::provider::QuoteProvider;
use crate::store::MemoryCache;

const SNAPSHOT_KEY: &str = "snapshot";

/// Running state of one snapshot refresh across the tracked symbols.
#[derive(Debug, Default, Clone, PartialEq)]
struct SnapshotFold {
    successes: usize,
    quota_exhausted: bool,
    message: Option<String>,
}

impl SnapshotFold {
    /// Accounts for one symbol's fetch. A quota signal breaks the fold: it applies
    /// to every later call to the same provider in this cycle.
    fn step(&mut self, symbol: &str, result: &ProviderResult<Quote>) -> ControlFlow<()> {
        match result {
            Ok(_) => {
                self.successes += 1;
                ControlFlow::Continue(())
            }
            Err(ProviderError::QuotaExceeded(message)) => {
                warn!(%symbol, %message, "Quote quota exhausted, keeping last known prices");
                self.quota_exhausted = true;
                self.message = Some(message.clone());
                ControlFlow::Break(())
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Quote fetch failed, keeping last known price");
                ControlFlow::Continue(())
            }
        }
    }

    fn into_meta(self, tracked: usize) -> ResponseMeta {
        ResponseMeta {
            updated_at: Utc::now(),
            stale: self.quota_exhausted || self.successes < tracked,
            quota_exhausted: self.quota_exhausted,
            source: if self.successes > 0 {
                DataSource::Live
            } else {
                DataSource::Cache
            },
            message: self.message,
        }
    }
}

/// Aggregates quotes for every tracked symbol into a cached snapshot.
pub struct MarketService {
    provider: Arc<dyn QuoteProvider>,
    symbols: Vec<TrackedSymbol>,
    last_known: Arc<LastKnownGood>,
    cache: Arc<dyn Cache<String, SnapshotResponse>>,
    ttl: Duration,
    request_timeout: Duration,
}

impl MarketService {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        last_known: Arc<LastKnownGood>,
        config: &AppConfig,
    ) -> Self {
        MarketService {
            provider,
            symbols: config.symbols.clone(),
            last_known,
            cache: Arc::new(MemoryCache::new()),
            ttl: config.cache.snapshot_ttl(),
            request_timeout: config.request_timeout(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache<String, SnapshotResponse>>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the current snapshot, refreshing it from the provider once the
    /// cached one has expired.
    ///
    /// Never fails: symbols that could not be fetched keep their last known quote
    /// and the meta reports how fresh the result is.
    pub async fn snapshot(&self) -> SnapshotResponse {
        let key = SNAPSHOT_KEY.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            return cached;
        }

        let mut fold = SnapshotFold::default();
        for symbol in &self.symbols {
            let result =
                with_timeout(self.request_timeout, self.provider.fetch_quote(symbol)).await;
            let flow = fold.step(&symbol.symbol, &result);
            if let Ok(quote) = result {
                self.last_known.record(quote).await;
            }
            if flow.is_break() {
                break;
            }
        }

        debug!(
            successes = fold.successes,
            tracked = self.symbols.len(),
            "Snapshot refresh finished"
        );
        let response = SnapshotResponse {
            data: self.last_known.collect(&self.symbols).await,
            meta: fold.into_meta(self.symbols.len()),
        };
        info!(
            stale = response.meta.stale,
            source = %response.meta.source,
            "Built market snapshot"
        );

        self.cache.put(key, response.clone(), self.ttl).await;
        response
    }
}
