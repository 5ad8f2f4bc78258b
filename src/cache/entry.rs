//! Cache Entry Module
//!
//! Defines individual cache entries and the clock that stamps their accesses.

use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// Represents a single cache entry with its payload and recency stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored payload
    pub data: V,
    /// Last write or successful read
    pub last_accessed_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped at `at`.
    pub fn new(data: V, at: DateTime<Utc>) -> Self {
        Self {
            data,
            last_accessed_at: at,
        }
    }
}

// == Access Clock ==
/// Issues access timestamps that never repeat within one cache.
///
/// Wall-clock readings that fail to advance past the previous stamp are
/// bumped by one nanosecond, so recency follows call order even when the
/// system clock is coarse or steps backwards.
#[derive(Debug, Default, Clone)]
pub struct AccessClock {
    last: Option<DateTime<Utc>>,
}

impl AccessClock {
    pub fn new() -> Self {
        Self::default()
    }

    // == Tick ==
    /// Returns the next timestamp, strictly greater than any issued before.
    pub fn tick(&mut self) -> DateTime<Utc> {
        self.advance(Utc::now())
    }

    fn advance(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last {
            Some(last) if now <= last => last + Duration::nanoseconds(1),
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}
