//! Core business types and abstractions

pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod market;
pub mod provider;

// Re-export main types for cleaner imports
pub use config::{AppConfig, TrackedSymbol};
pub use error::{ProviderError, ProviderResult, ValidationError};
pub use market::{
    CandlePoint, ChartRange, DataSource, Headline, HistoryResponse, NewsResponse, Quote,
    ResponseMeta, SnapshotResponse,
};
pub use provider::{HeadlineProvider, HistoryProvider, QuoteProvider};
