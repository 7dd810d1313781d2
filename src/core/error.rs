//! Error kinds shared by providers and services

use thiserror::Error;

/// Failure reported by a market data provider.
///
/// `QuotaExceeded` is the only recoverable kind: services turn it into a
/// degraded response. Everything else is a provider failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The provider rate limited the request.
    #[error("{0}")]
    QuotaExceeded(String),

    /// The request did not complete within the configured timeout.
    #[error("Provider request timed out")]
    Timeout,

    /// Any other upstream error.
    #[error("{0}")]
    Failure(String),
}

impl ProviderError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, ProviderError::QuotaExceeded(_))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Rejected caller input, raised before any provider is contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unsupported commodity symbol: {0}")]
    UnknownSymbol(String),

    #[error("Unsupported chart range: {0}")]
    UnknownRange(String),
}
