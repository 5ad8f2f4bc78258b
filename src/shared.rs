//! Shared Cache Module
//!
//! Thread-safe handle around a [`RingCache`].
//!
//! The entry map and recency index are mutated as a pair, so every operation
//! holds one lock for its whole duration. Lookups take the write lock because
//! they refresh recency and bump counters; only pure projections share the
//! read lock.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cache::{CacheStats, Payload, Produced, RingCache};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Cloneable handle to a cache shared across tasks.
#[derive(Debug)]
pub struct SharedRingCache<K, V> {
    inner: Arc<RwLock<RingCache<K, V>>>,
}

impl<K, V> Clone for SharedRingCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedRingCache<K, V>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Payload,
{
    /// Wraps an existing cache.
    pub fn new(cache: RingCache<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a shared cache from configuration.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        Ok(Self::new(RingCache::new(config)?))
    }

    pub async fn read(&self, key: &K) -> Result<Option<V>> {
        self.inner.write().await.read(key)
    }

    pub async fn read_strict(&self, key: &K) -> Result<V> {
        self.inner.write().await.read_strict(key)
    }

    pub async fn write(&self, key: K, data: V) -> Option<K> {
        self.inner.write().await.write(key, data)
    }

    /// Fetches under a single lock. `producer` runs while the lock is held,
    /// so concurrent fetches of a missing key compute it once.
    pub async fn fetch<F, P>(&self, key: K, producer: F) -> Result<V>
    where
        F: FnOnce() -> P,
        P: Into<Produced<V>>,
    {
        self.inner.write().await.fetch(key, producer)
    }

    pub async fn try_fetch<F, P, E>(&self, key: K, producer: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<P, E>,
        P: Into<Produced<V>>,
        E: From<CacheError>,
    {
        self.inner.write().await.try_fetch(key, producer)
    }

    pub async fn evict(&self, key: &K) -> bool {
        self.inner.write().await.evict(key)
    }

    pub async fn reset(&self) {
        self.inner.write().await.reset()
    }

    pub async fn has_key(&self, key: &K) -> bool {
        self.inner.read().await.has_key(key)
    }

    pub async fn size(&self) -> usize {
        self.inner.read().await.size()
    }

    pub async fn last_access(&self, key: &K) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_access(key)
    }

    pub async fn hit_rate(&self) -> f64 {
        self.inner.read().await.hit_rate()
    }

    pub async fn must_evict(&self) -> bool {
        self.inner.read().await.must_evict()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn check_invariants(&self) -> Result<()> {
        self.inner.read().await.check_invariants()
    }

    /// Runs `f` with exclusive access, for compound operations that must not
    /// interleave with other callers.
    pub async fn with_cache<R>(&self, f: impl FnOnce(&mut RingCache<K, V>) -> R) -> R {
        let mut cache = self.inner.write().await;
        f(&mut cache)
    }
}
