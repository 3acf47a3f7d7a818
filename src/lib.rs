//! TTL LRU Cache - A bounded in-memory key/value cache
//!
//! Combines least-recently-used ordering, per-entry TTL expiry and an
//! aggregate memory budget over one store, driven by a single expiry timer
//! and deferred pruning on a tokio `LocalSet`.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, MemoryUsage, SizeEstimate, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
