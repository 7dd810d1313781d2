//! Provider capability traits the services depend on

use async_trait::async_trait;

use super::config::TrackedSymbol;
use super::error::ProviderResult;
use super::market::{CandlePoint, ChartRange, Headline, Quote};

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &TrackedSymbol) -> ProviderResult<Quote>;
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Returns candles sorted ascending by time.
    async fn fetch_history(
        &self,
        symbol: &TrackedSymbol,
        range: ChartRange,
    ) -> ProviderResult<Vec<CandlePoint>>;
}

#[async_trait]
pub trait HeadlineProvider: Send + Sync {
    async fn fetch_headlines(&self, symbol: &TrackedSymbol) -> ProviderResult<Vec<Headline>>;
}
