//! Entry Store Module
//!
//! Key/entry map paired with its recency index. Every mutation here updates
//! both structures together.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::cache::{CacheEntry, RecencyIndex};
use crate::error::{CacheError, Result};

// == Entry Store ==
/// Entry map plus recency index.
///
/// For every stored key `k` the index holds exactly one pair
/// `(entries[k].last_accessed_at, k)`.
#[derive(Debug, Clone)]
pub struct EntryStore<K, V> {
    /// Key-entry storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Access order
    index: RecencyIndex<K>,
}

impl<K, V> EntryStore<K, V>
where
    K: Hash + Eq + Ord + Clone + Debug,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            index: RecencyIndex::new(),
        }
    }

    // == Insert ==
    /// Stores `data` under `key` stamped at `at`.
    ///
    /// An existing entry for the key is replaced and its old index pair
    /// dropped. Returns the replaced payload.
    pub fn insert(&mut self, key: K, data: V, at: DateTime<Utc>) -> Option<V> {
        let previous = self.remove(&key).map(|entry| entry.data);

        self.index.insert(at, key.clone());
        self.entries.insert(key, CacheEntry::new(data, at));

        previous
    }

    // == Touch ==
    /// Moves `key` to recency `at` and returns its stored payload.
    ///
    /// Returns None without changing anything if the key is absent.
    pub fn touch_mut(&mut self, key: &K, at: DateTime<Utc>) -> Option<&mut V> {
        let entry = self.entries.get_mut(key)?;

        self.index.remove(entry.last_accessed_at, key);
        self.index.insert(at, key.clone());
        entry.last_accessed_at = at;

        Some(&mut entry.data)
    }

    // == Remove ==
    /// Removes `key`, dropping its index pair by the stored timestamp.
    pub fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.index.remove(entry.last_accessed_at, key);
        Some(entry)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently accessed entry.
    pub fn pop_oldest(&mut self) -> Option<(K, CacheEntry<V>)> {
        let (at, key) = self.index.pop_oldest()?;
        let entry = self.entries.remove(&key)?;
        debug_assert_eq!(entry.last_accessed_at, at);
        Some((key, entry))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn last_access(&self, key: &K) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.last_accessed_at)
    }

    /// Keys from least to most recently accessed.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.index.iter().map(|(_, key)| key)
    }

    // == Clear ==
    /// Drops every entry and index pair.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of pairs in the recency index. Equal to `len()` whenever the
    /// store is consistent.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    // == Check Invariants ==
    /// Verifies that map and index describe the same set of entries.
    pub fn check_invariants(&self) -> Result<()> {
        if self.index.len() != self.entries.len() {
            return Err(CacheError::Invariant(format!(
                "index holds {} pairs for {} entries",
                self.index.len(),
                self.entries.len()
            )));
        }

        for (at, key) in self.index.iter() {
            match self.entries.get(key) {
                Some(entry) if entry.last_accessed_at == *at => {}
                Some(entry) => {
                    return Err(CacheError::Invariant(format!(
                        "index pair for {:?} stamped {} but entry stamped {}",
                        key, at, entry.last_accessed_at
                    )));
                }
                None => {
                    return Err(CacheError::Invariant(format!(
                        "index references missing key {:?}",
                        key
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<K, V> Default for EntryStore<K, V>
where
    K: Hash + Eq + Ord + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
