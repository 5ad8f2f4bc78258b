//! Eviction Policy Module
//!
//! Decides whether a write must make room before admitting a new key.

use std::fmt;

use serde::Serialize;

use crate::config::CacheConfig;
use crate::error::Result;

/// Which limit asked for an eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionTrigger {
    /// The cache already holds `capacity` entries
    Capacity,
    /// The observed hit rate reached the target
    HitRate,
}

impl fmt::Display for EvictionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionTrigger::Capacity => f.write_str("capacity"),
            EvictionTrigger::HitRate => f.write_str("hit_rate"),
        }
    }
}

// == Eviction Policy ==
/// Capacity and target-hit-rate limits. Either, both or neither may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvictionPolicy {
    capacity: Option<usize>,
    target_hit_rate: Option<f64>,
}

impl EvictionPolicy {
    /// Builds the policy from a validated configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            capacity: config.capacity,
            target_hit_rate: config.target_hit_rate,
        })
    }

    /// A policy that never evicts.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn target_hit_rate(&self) -> Option<f64> {
        self.target_hit_rate
    }

    // == Trigger ==
    /// Returns the limit that requires an eviction, if any.
    ///
    /// `size` is the entry count before the pending insert. The hit-rate
    /// limit can fire at any size, including an empty cache.
    pub fn trigger(&self, size: usize, hit_rate: f64) -> Option<EvictionTrigger> {
        if matches!(self.capacity, Some(capacity) if size >= capacity) {
            return Some(EvictionTrigger::Capacity);
        }

        if matches!(self.target_hit_rate, Some(target) if hit_rate >= target) {
            return Some(EvictionTrigger::HitRate);
        }

        None
    }

    // == Must Evict ==
    pub fn must_evict(&self, size: usize, hit_rate: f64) -> bool {
        self.trigger(size, hit_rate).is_some()
    }
}
