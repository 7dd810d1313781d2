//! Caching and fallback services sitting between providers and callers

pub mod history;
pub mod last_known;
pub mod market;
pub mod news;

pub use history::{HistoryService, synthesize_history};
pub use last_known::LastKnownGood;
pub use market::MarketService;
pub use news::NewsService;

use crate::core::error::{ProviderError, ProviderResult};
use std::future::Future;
use std::time::Duration;

/// Runs a provider call, reporting [`ProviderError::Timeout`] if it outlives `timeout`.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, call: F) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(ProviderError::Timeout))
}
