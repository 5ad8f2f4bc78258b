//! Configuration Module
//!
//! Cache construction options and the workload runner settings, both loadable
//! from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{CacheError, Result};

/// Cache construction options.
///
/// `capacity` and `target_hit_rate` are both optional; with neither set the
/// cache is unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of entries, None = unbounded by count
    pub capacity: Option<usize>,
    /// Hit rate at which writes start trimming the oldest entry
    pub target_hit_rate: Option<f64>,
    /// Copy payloads before storing them
    pub duplicate_on_store: bool,
    /// Copy payloads before handing them back
    pub duplicate_on_retrieve: bool,
    /// Operation names invoked on every retrieved payload, in order
    pub execute_on_retrieve: Vec<String>,
}

impl CacheConfig {
    /// Creates an unbounded configuration with every toggle off.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_target_hit_rate(mut self, target_hit_rate: f64) -> Self {
        self.target_hit_rate = Some(target_hit_rate);
        self
    }

    pub fn duplicate_on_store(mut self, enabled: bool) -> Self {
        self.duplicate_on_store = enabled;
        self
    }

    pub fn duplicate_on_retrieve(mut self, enabled: bool) -> Self {
        self.duplicate_on_retrieve = enabled;
        self
    }

    /// Appends a retrieval hook. Hooks run in the order they were added.
    pub fn execute_on_retrieve(mut self, operation: impl Into<String>) -> Self {
        self.execute_on_retrieve.push(operation.into());
        self
    }

    // == Validate ==
    /// Checks the numeric options.
    ///
    /// The target hit rate must lie strictly between 0.0 and 1.0 and the
    /// capacity, when set, must be positive.
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.target_hit_rate {
            // NaN fails both comparisons
            if !(rate > 0.0 && rate < 1.0) {
                return Err(CacheError::InvalidConfig(format!(
                    "target_hit_rate must be between 0.0 and 1.0 exclusive, got {}",
                    rate
                )));
            }
        }

        if self.capacity == Some(0) {
            return Err(CacheError::InvalidConfig(
                "capacity must be a positive integer".to_string(),
            ));
        }

        Ok(())
    }

    /// Creates a CacheConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum entries (default: unbounded)
    /// - `CACHE_TARGET_HIT_RATE` - Target hit rate (default: unset)
    /// - `CACHE_DUPLICATE_ON_STORE` - `true`/`1` to copy on store (default: false)
    /// - `CACHE_DUPLICATE_ON_RETRIEVE` - `true`/`1` to copy on retrieve (default: false)
    /// - `CACHE_EXECUTE_ON_RETRIEVE` - Comma separated hook names (default: none)
    ///
    /// Values that fail to parse fall back to their defaults; range checks are
    /// left to [`CacheConfig::validate`].
    pub fn from_env() -> Self {
        Self {
            capacity: env_parse("CACHE_CAPACITY"),
            target_hit_rate: env_parse("CACHE_TARGET_HIT_RATE"),
            duplicate_on_store: env_flag("CACHE_DUPLICATE_ON_STORE"),
            duplicate_on_retrieve: env_flag("CACHE_DUPLICATE_ON_RETRIEVE"),
            execute_on_retrieve: env::var("CACHE_EXECUTE_ON_RETRIEVE")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
        }
    }
}

/// Settings for the random-data workload runner.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WorkloadConfig {
    /// Number of distinct generated elements
    pub elements: usize,
    /// Length of each generated key
    pub key_length: usize,
    /// Total fetch operations across all workers
    pub operations: usize,
    /// Number of concurrent tokio tasks
    pub workers: usize,
    /// Seed for reproducible runs, None = from entropy
    pub seed: Option<u64>,
}

impl WorkloadConfig {
    /// Creates a WorkloadConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `WORKLOAD_ELEMENTS` - Distinct elements (default: 2000)
    /// - `WORKLOAD_KEY_LENGTH` - Key length, at most 26 (default: 10)
    /// - `WORKLOAD_OPERATIONS` - Total fetches (default: 10000)
    /// - `WORKLOAD_WORKERS` - Concurrent tasks (default: 4)
    /// - `WORKLOAD_SEED` - RNG seed (default: random)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            elements: env_parse("WORKLOAD_ELEMENTS").unwrap_or(defaults.elements),
            key_length: env_parse("WORKLOAD_KEY_LENGTH").unwrap_or(defaults.key_length),
            operations: env_parse("WORKLOAD_OPERATIONS").unwrap_or(defaults.operations),
            workers: env_parse("WORKLOAD_WORKERS").unwrap_or(defaults.workers),
            seed: env_parse("WORKLOAD_SEED"),
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            elements: 2_000,
            key_length: 10,
            operations: 10_000,
            workers: 4,
            seed: None,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
