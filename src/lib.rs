//! Ring Cache - a bounded in-process cache
//!
//! Evicts by recency and can additionally trim itself once the observed hit
//! rate reaches a target.

pub mod cache;
pub mod config;
pub mod error;
pub mod shared;
pub mod workload;

pub use cache::{Payload, Produced, RingCache};
pub use config::{CacheConfig, WorkloadConfig};
pub use error::{CacheError, Result};
pub use shared::SharedRingCache;
