use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::cache::Cache;
use crate::core::config::TrackedSymbol;
use crate::core::market::Quote;
use crate::store::DiskCache;

/// Most recent good quote per symbol.
///
/// Entries are only ever replaced by newer successful fetches, never removed.
#[derive(Default)]
pub struct LastKnownGood {
    quotes: RwLock<HashMap<String, Quote>>,
    journal: Option<Arc<DiskCache<String, Quote>>>,
}

impl LastKnownGood {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one placeholder quote per symbol from its static seed price.
    pub fn seeded(symbols: &[TrackedSymbol]) -> Self {
        let now = Utc::now();
        let quotes = symbols
            .iter()
            .map(|s| {
                let quote = Quote::new(
                    &s.symbol,
                    &s.name,
                    s.seed_price,
                    s.seed_price * 0.998,
                    "USD",
                    now,
                );
                (s.symbol.clone(), quote)
            })
            .collect();

        LastKnownGood {
            quotes: RwLock::new(quotes),
            journal: None,
        }
    }

    /// Seeds the table, then overlays quotes recorded into `journal` by earlier runs.
    /// Later records are written through to the journal.
    pub async fn restore(
        symbols: &[TrackedSymbol],
        journal: Option<Arc<DiskCache<String, Quote>>>,
    ) -> Self {
        let mut table = Self::seeded(symbols);
        if let Some(journal) = &journal {
            let quotes = table.quotes.get_mut();
            for s in symbols {
                if let Some(quote) = journal.get(&s.symbol).await {
                    debug!(symbol = %s.symbol, price = quote.price, "Restored last known good quote");
                    quotes.insert(s.symbol.clone(), quote);
                }
            }
        }
        table.journal = journal;
        table
    }

    pub async fn get(&self, symbol: &str) -> Option<Quote> {
        self.quotes.read().await.get(symbol).cloned()
    }

    pub async fn record(&self, quote: Quote) {
        debug!(symbol = %quote.symbol, price = quote.price, "Recording last known good quote");
        if let Some(journal) = &self.journal {
            journal.put_permanent(quote.symbol.clone(), quote.clone());
        }
        self.quotes.write().await.insert(quote.symbol.clone(), quote);
    }

    /// Current quotes in the order of `symbols`, skipping any never recorded.
    pub async fn collect(&self, symbols: &[TrackedSymbol]) -> Vec<Quote> {
        let quotes = self.quotes.read().await;
        symbols
            .iter()
            .filter_map(|s| quotes.get(&s.symbol).cloned())
            .collect()
    }
}
