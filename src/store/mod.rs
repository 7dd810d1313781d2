pub mod disk;
pub mod memory;

pub use disk::DiskCache;
pub use memory::MemoryCache;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Hands out named caches, backed by an on-disk keyspace when one is open.
pub struct Store {
    keyspace: Option<Keyspace>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache store at {}", path.display()))?;
        debug!("Opened cache store at {}", path.display());
        Ok(Self {
            keyspace: Some(keyspace),
        })
    }

    pub fn in_memory() -> Self {
        Self { keyspace: None }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match config.cache_path()? {
            Some(path) => Self::open(&path),
            None => Ok(Self::in_memory()),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.keyspace.is_some()
    }

    /// Opens the partition `name` as a [`DiskCache`], or `None` for an in-memory store.
    pub fn disk_cache<K, V>(&self, name: &str) -> Result<Option<Arc<DiskCache<K, V>>>>
    where
        K: Serialize + Debug,
        V: Serialize + DeserializeOwned,
    {
        let Some(keyspace) = &self.keyspace else {
            return Ok(None);
        };
        let partition = keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open cache partition {name}"))?;
        Ok(Some(Arc::new(DiskCache::new(keyspace.clone(), partition))))
    }

    pub fn cache<K, V>(&self, name: &str) -> Result<Arc<dyn Cache<K, V>>>
    where
        K: Eq + Hash + Serialize + Debug + Send + Sync + 'static,
        V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let cache: Arc<dyn Cache<K, V>> = match self.disk_cache(name)? {
            Some(disk) => disk,
            None => Arc::new(MemoryCache::new()),
        };
        Ok(cache)
    }
}
