//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Lookups and deletes never
//! fail; only configuration and explicit TTL arguments are validated.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// TTL is zero or otherwise unusable
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Item or memory ceiling is out of range
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    /// Configuration document could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::InvalidConfig(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
