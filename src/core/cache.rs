//! Caching abstraction shared by the services

use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with per-entry expiry.
///
/// Entries are only removed once a read finds them past their expiry; there is
/// no background sweep and no size bound.
#[async_trait]
pub trait Cache<K, V>: Send + Sync {
    /// Returns the live value for `key`, deleting the entry if it has expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`, replacing any existing entry, to expire after `ttl`.
    async fn put(&self, key: K, value: V, ttl: Duration);
}
