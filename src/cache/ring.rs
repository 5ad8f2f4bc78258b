//! Ring Cache Module
//!
//! Public cache API: reads refresh recency and feed the hit rate, writes make
//! room according to the eviction policy.

use std::fmt::Debug;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::payload::run_retrieval_hooks;
use crate::cache::{AccessClock, CacheStats, EntryStore, EvictionPolicy, Payload};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Produced ==
/// Result of a `fetch` producer.
///
/// Producers that return a bare value get it cached; returning
/// [`Produced::Skip`] hands the value back without storing it.
#[derive(Debug, Clone, PartialEq)]
pub enum Produced<V> {
    /// Store the value, then return it
    Cache(V),
    /// Return the value without storing it
    Skip(V),
}

impl<V> Produced<V> {
    pub fn into_inner(self) -> V {
        match self {
            Produced::Cache(value) | Produced::Skip(value) => value,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(self, Produced::Cache(_))
    }
}

impl<V> From<V> for Produced<V> {
    fn from(value: V) -> Self {
        Produced::Cache(value)
    }
}

// == Ring Cache ==
/// Bounded cache evicting the least recently accessed entry.
///
/// Besides a fixed capacity, the cache can trim itself whenever the observed
/// hit rate reaches a target: each write of a new key then evicts the oldest
/// entry, even below capacity. At most one entry is evicted per write.
///
/// ```
/// use ring_cache::{CacheConfig, RingCache};
///
/// let mut cache = RingCache::new(CacheConfig::new().with_capacity(2)).unwrap();
/// cache.write("a", 1);
/// cache.write("b", 2);
/// cache.write("c", 3);
///
/// assert!(!cache.has_key(&"a"));
/// assert_eq!(cache.fetch("d", || 4).unwrap(), 4);
/// assert_eq!(cache.size(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RingCache<K, V> {
    /// Entries and their recency index
    store: EntryStore<K, V>,
    /// Capacity and hit-rate limits
    policy: EvictionPolicy,
    /// Access counters
    stats: CacheStats,
    /// Timestamp source for recency
    clock: AccessClock,
    /// Duplication toggles and retrieval hooks
    config: CacheConfig,
}

impl<K, V> RingCache<K, V>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Payload,
{
    // == Constructor ==
    /// Creates a cache from `config`.
    ///
    /// Fails with [`CacheError::InvalidConfig`] when the target hit rate is
    /// outside (0, 1) or the capacity is zero.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let policy = EvictionPolicy::from_config(&config)?;

        debug!(
            "Ring cache created: capacity={:?}, target_hit_rate={:?}, hooks={:?}",
            config.capacity, config.target_hit_rate, config.execute_on_retrieve
        );

        Ok(Self {
            store: EntryStore::new(),
            policy,
            stats: CacheStats::new(),
            clock: AccessClock::new(),
            config,
        })
    }

    /// Creates a cache with no limits and no toggles.
    pub fn unbounded() -> Self {
        Self {
            store: EntryStore::new(),
            policy: EvictionPolicy::unbounded(),
            stats: CacheStats::new(),
            clock: AccessClock::new(),
            config: CacheConfig::default(),
        }
    }

    /// Creates a capacity-bounded cache with default toggles.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(CacheConfig::new().with_capacity(capacity))
    }

    // == Read ==
    /// Looks up `key`, returning `Ok(None)` on a miss.
    ///
    /// Same side effects as [`read_strict`](Self::read_strict).
    pub fn read(&mut self, key: &K) -> Result<Option<V>> {
        match self.read_strict(key) {
            Ok(data) => Ok(Some(data)),
            Err(CacheError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    // == Read Strict ==
    /// Looks up `key`, failing with [`CacheError::NotFound`] on a miss.
    ///
    /// Every call counts as an access. A hit refreshes the key's recency and
    /// counts a hit before the retrieval hooks run. With duplicate-on-retrieve
    /// the hooks run on a deep copy and the cached payload is left alone;
    /// otherwise they run on the cached payload itself and the caller gets a
    /// clone of the result. Hook failures are returned after the hit has been
    /// recorded.
    pub fn read_strict(&mut self, key: &K) -> Result<V> {
        self.stats.record_access();

        let hooks = &self.config.execute_on_retrieve;
        let duplicate = self.config.duplicate_on_retrieve;
        let at = self.clock.tick();
        let Some(stored) = self.store.touch_mut(key, at) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound(format!("{:?}", key)));
        };
        self.stats.record_hit();

        let result = if duplicate && !stored.is_nil() {
            let mut data = stored.duplicate();
            run_retrieval_hooks(&mut data, hooks).map(|_| data)
        } else {
            run_retrieval_hooks(&mut *stored, hooks).map(|_| stored.clone())
        };

        if let Err(err) = &result {
            warn!("Retrieval hook failed for {:?}: {}", key, err);
        }
        result
    }

    // == Write ==
    /// Stores `data` under `key` and returns the key evicted to make room.
    ///
    /// Overwriting an existing key never evicts another entry. For a new key
    /// the eviction policy is consulted first and at most the single oldest
    /// entry is removed.
    pub fn write(&mut self, key: K, data: V) -> Option<K> {
        let evicted = match self.store.remove(&key) {
            Some(_) => None,
            None => self.make_room(),
        };

        let data = if self.config.duplicate_on_store && !data.is_nil() {
            data.duplicate()
        } else {
            data
        };

        let at = self.clock.tick();
        self.store.insert(key, data, at);
        self.stats.set_total_entries(self.store.len());

        evicted
    }

    // == Fetch ==
    /// Returns the cached value for `key`, computing it on a miss.
    ///
    /// `producer` runs at most once, only on a miss. Its output is cached
    /// unless it is a [`Produced::Skip`].
    pub fn fetch<F, P>(&mut self, key: K, producer: F) -> Result<V>
    where
        F: FnOnce() -> P,
        P: Into<Produced<V>>,
    {
        self.try_fetch(key, || Ok::<P, CacheError>(producer()))
    }

    /// [`fetch`](Self::fetch) with a fallible producer.
    ///
    /// A producer error is returned as is and nothing is cached.
    pub fn try_fetch<F, P, E>(&mut self, key: K, producer: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<P, E>,
        P: Into<Produced<V>>,
        E: From<CacheError>,
    {
        if let Some(data) = self.read(&key)? {
            return Ok(data);
        }

        let produced: Produced<V> = producer()?.into();
        let cacheable = produced.is_cacheable();
        let data = produced.into_inner();
        if cacheable {
            self.write(key, data.clone());
        }
        Ok(data)
    }

    // == Evict ==
    /// Removes `key` if present. Returns whether it existed.
    pub fn evict(&mut self, key: &K) -> bool {
        let existed = self.store.remove(key).is_some();
        if existed {
            self.stats.set_total_entries(self.store.len());
            debug!("Evicted {:?} on request", key);
        }
        existed
    }

    // == Reset ==
    /// Drops every entry and zeroes all counters.
    pub fn reset(&mut self) {
        self.store.clear();
        self.stats.reset();
        debug!("Ring cache reset");
    }

    pub fn has_key(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Timestamp of the key's last write or successful read.
    pub fn last_access(&self, key: &K) -> Option<DateTime<Utc>> {
        self.store.last_access(key)
    }

    /// Hits divided by accesses, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        self.stats.hit_rate()
    }

    /// Whether writing a new key right now would evict the oldest entry.
    pub fn must_evict(&self) -> bool {
        self.policy.must_evict(self.store.len(), self.stats.hit_rate())
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.store.len());
        stats
    }

    pub fn capacity(&self) -> Option<usize> {
        self.policy.capacity()
    }

    pub fn target_hit_rate(&self) -> Option<f64> {
        self.policy.target_hit_rate()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Keys from least to most recently accessed.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.store.keys_by_recency()
    }

    /// Verifies the entry map and recency index agree.
    pub fn check_invariants(&self) -> Result<()> {
        self.store.check_invariants()
    }

    // == Make Room ==
    /// Evicts the oldest entry if the policy asks for it.
    fn make_room(&mut self) -> Option<K> {
        let hit_rate = self.stats.hit_rate();
        let trigger = self.policy.trigger(self.store.len(), hit_rate)?;
        let (key, _) = self.store.pop_oldest()?;

        self.stats.record_eviction();
        debug!(
            "Evicted {:?} ({} limit), size={}, hit_rate={:.3}",
            key,
            trigger,
            self.store.len(),
            hit_rate
        );

        Some(key)
    }
}

impl<K, V> Default for RingCache<K, V>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Payload,
{
    fn default() -> Self {
        Self::unbounded()
    }
}
