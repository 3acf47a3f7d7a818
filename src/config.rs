//! Configuration Module
//!
//! Cache limits and default TTL, immutable once the cache is built.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::cache::{Ttl, BYTES_PER_MB};
use crate::error::{CacheError, Result};

/// Cache configuration.
///
/// Every option defaults to unbounded. Can be deserialized from JSON using
/// the option names `ttl` (milliseconds), `maxItems` and `maxMemoryInMb`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CacheConfig {
    /// TTL applied by `set` when no explicit TTL is given
    #[serde(deserialize_with = "deserialize_ttl_ms")]
    pub ttl: Ttl,
    /// Maximum number of entries, None = unbounded
    pub max_items: Option<usize>,
    /// Memory budget in megabytes, None = unbounded
    pub max_memory_in_mb: Option<f64>,
}

impl CacheConfig {
    /// Creates a configuration with every limit unbounded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.ttl = ttl.into();
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn max_memory_in_mb(mut self, megabytes: f64) -> Self {
        self.max_memory_in_mb = Some(megabytes);
        self
    }

    /// Rejects settings that would produce meaningless eviction behaviour.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidTtl(
                "default TTL must be greater than zero".to_string(),
            ));
        }
        if self.max_items == Some(0) {
            return Err(CacheError::InvalidLimit(
                "maxItems must be at least 1".to_string(),
            ));
        }
        if let Some(mb) = self.max_memory_in_mb {
            if !mb.is_finite() || mb <= 0.0 {
                return Err(CacheError::InvalidLimit(format!(
                    "maxMemoryInMb must be a positive finite number, got {}",
                    mb
                )));
            }
        }
        Ok(())
    }

    /// Memory budget converted to bytes.
    pub fn max_memory_bytes(&self) -> Option<usize> {
        self.max_memory_in_mb
            .map(|mb| (mb * BYTES_PER_MB).floor() as usize)
    }
}

fn deserialize_ttl_ms<'de, D>(deserializer: D) -> std::result::Result<Ttl, D::Error>
where
    D: Deserializer<'de>,
{
    let millis: Option<u64> = Option::deserialize(deserializer)?;
    Ok(millis.map(Duration::from_millis).into())
}
