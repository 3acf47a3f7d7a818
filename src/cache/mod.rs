//! Cache Module
//!
//! Provides an in-memory cache with LRU ordering, TTL expiration and a
//! memory budget.

mod entry;
mod expiry;
mod size;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, Expiry, Ttl};
pub use expiry::ExpiryIndex;
pub use size::{
    estimate, Json, Opaque, SizeEstimate, BOOL_SIZE, FLOAT_SIZE, INTEGER_HEADER_SIZE,
};
pub use stats::{CacheStats, MemoryCounter, MemoryUsage, BYTES_PER_MB};
pub use store::Cache;
