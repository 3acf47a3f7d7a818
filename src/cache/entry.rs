//! Cache Entry Module
//!
//! Defines individual cache entries and the expiry values attached to them.

use std::time::Duration;

use tokio::time::Instant;

// == Expiry ==
/// Absolute expiry point of an entry.
///
/// `Never` orders after every finite instant, so the derived `Ord` can be
/// used directly when comparing deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expiry {
    /// Expires once the clock reaches this instant
    At(Instant),
    /// Never expires
    Never,
}

impl Expiry {
    // == From TTL ==
    /// Resolves a TTL relative to `now`.
    ///
    /// A deadline that would overflow the clock is treated as `Never`.
    pub fn from_ttl(now: Instant, ttl: Ttl) -> Self {
        match ttl {
            Ttl::Never => Expiry::Never,
            Ttl::After(duration) => now
                .checked_add(duration)
                .map_or(Expiry::Never, Expiry::At),
        }
    }

    // == Is Live ==
    /// Checks whether the entry is still readable at `now`.
    ///
    /// Boundary condition: an entry is dead from its expiry instant onward.
    pub fn is_live_at(&self, now: Instant) -> bool {
        match self {
            Expiry::At(at) => now < *at,
            Expiry::Never => true,
        }
    }
}

// == TTL ==
/// Time-to-live argument for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// No expiry
    #[default]
    Never,
    /// Expires after the given duration
    After(Duration),
}

impl Ttl {
    /// Returns true for a finite TTL of zero length.
    pub fn is_zero(&self) -> bool {
        matches!(self, Ttl::After(d) if d.is_zero())
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl::After(duration)
    }
}

impl From<Option<Duration>> for Ttl {
    fn from(duration: Option<Duration>) -> Self {
        duration.map_or(Ttl::Never, Ttl::After)
    }
}

// == Cache Entry ==
/// A single stored value with its size estimate and expiry.
///
/// Entries are never mutated in place; an overwrite replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Estimated footprint in bytes
    pub size: usize,
    /// When the entry stops being readable
    pub expires_at: Expiry,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, size: usize, expires_at: Expiry) -> Self {
        Self {
            value,
            size,
            expires_at,
        }
    }

    /// Checks if the entry can still be read at `now`.
    pub fn is_live_at(&self, now: Instant) -> bool {
        self.expires_at.is_live_at(now)
    }
}
