//! Cache Module
//!
//! In-process cache with recency eviction and target-hit-rate trimming.

mod entry;
pub mod payload;
mod policy;
mod recency;
mod ring;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{AccessClock, CacheEntry};
pub use payload::Payload;
pub use policy::{EvictionPolicy, EvictionTrigger};
pub use recency::RecencyIndex;
pub use ring::{Produced, RingCache};
pub use stats::CacheStats;
pub use store::EntryStore;
