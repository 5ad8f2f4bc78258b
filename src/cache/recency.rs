//! Recency Index Module
//!
//! Ordered set of `(timestamp, key)` pairs used to find the oldest entry.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

// == Recency Index ==
/// Tracks access order for eviction.
///
/// Pairs are ordered by timestamp first and key second, so two keys stamped
/// at the same instant still occupy distinct slots. The first pair is the
/// globally oldest entry.
#[derive(Debug, Clone)]
pub struct RecencyIndex<K> {
    order: BTreeSet<(DateTime<Utc>, K)>,
}

impl<K: Ord + Clone> RecencyIndex<K> {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            order: BTreeSet::new(),
        }
    }

    // == Insert ==
    /// Records `key` as accessed at `at`.
    ///
    /// Returns false if the exact pair was already present. Callers are
    /// responsible for removing the key's previous pair first.
    pub fn insert(&mut self, at: DateTime<Utc>, key: K) -> bool {
        self.order.insert((at, key))
    }

    // == Remove ==
    /// Removes the pair `(at, key)`. Returns whether it was present.
    ///
    /// `at` must be the timestamp the pair was inserted with; any other
    /// value leaves the real pair in place.
    pub fn remove(&mut self, at: DateTime<Utc>, key: &K) -> bool {
        self.order.remove(&(at, key.clone()))
    }

    // == Pop Oldest ==
    /// Removes and returns the oldest pair.
    pub fn pop_oldest(&mut self) -> Option<(DateTime<Utc>, K)> {
        self.order.pop_first()
    }

    /// Iterates pairs from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &(DateTime<Utc>, K)> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked pairs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<K: Ord + Clone> Default for RecencyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
