use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// TTL cache stored in one fjall partition, readable by later processes.
///
/// Expiry uses wall-clock time since entries outlive the process that wrote them.
pub struct DiskCache<K, V> {
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: Serialize + DeserializeOwned,
{
    pub(crate) fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
            _marker: PhantomData,
        }
    }

    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(bytes) = self.partition.get(&raw_key)? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };

        let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
        if let Some(expires_at) = entry.expires_at {
            if SystemTime::now() > expires_at {
                debug!("Cache entry expired for key: {:?}", key);
                self.partition.remove(raw_key)?;
                return Ok(None);
            }
        }

        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &K, value: V, expires_at: Option<SystemTime>) -> Result<()> {
        let entry = CacheEntry { value, expires_at };
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(&entry)?)?;
        self.keyspace.persist(PersistMode::Buffer)?;
        debug!("Cache PUT for key: {:?}", key);
        Ok(())
    }

    /// Stores `value` with no expiry.
    pub fn put_permanent(&self, key: K, value: V) {
        if let Err(e) = self.write(&key, value, None) {
            warn!("DiskCache put error for key {:?}: {}", key, e);
        }
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Serialize + Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("DiskCache get error for key {:?}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Duration) {
        let expires_at = SystemTime::now().checked_add(ttl);
        if let Err(e) = self.write(&key, value, expires_at) {
            warn!("DiskCache put error for key {:?}: {}", key, e);
        }
    }
}
