//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Construction parameters were rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key not found in cache (strict read only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A configured retrieval hook is not supported by the retrieved data
    #[error("Retrieved data does not respond to {0:?}")]
    UnsupportedOperation(String),

    /// Entry store and recency index disagree
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl CacheError {
    /// Returns true for the strict-read miss signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
