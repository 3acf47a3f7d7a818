//! Cache Statistics Module
//!
//! Tracks hits, misses, evictions and expirations, plus the memory snapshot
//! reported to callers.

use serde::Serialize;

/// Bytes per megabyte used for the memory budget.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that found nothing live
    pub misses: u64,
    /// Number of entries removed by the pruner
    pub evictions: u64,
    /// Number of entries reaped after their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Adds `count` pruned entries.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    /// Adds `count` reaped entries.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Memory Counter ==
/// Running total of estimated entry sizes against an optional ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryCounter {
    current: usize,
    max: Option<usize>,
}

impl MemoryCounter {
    pub fn new(max: Option<usize>) -> Self {
        Self { current: 0, max }
    }

    pub fn add(&mut self, bytes: usize) {
        self.current = self.current.saturating_add(bytes);
    }

    /// Never drops below zero.
    pub fn sub(&mut self, bytes: usize) {
        self.current = self.current.saturating_sub(bytes);
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// True while the total is above the ceiling.
    pub fn exceeded(&self) -> bool {
        self.max.is_some_and(|max| self.current > max)
    }

    pub fn usage(&self) -> MemoryUsage {
        MemoryUsage::new(self.current, self.max)
    }
}

// == Memory Usage ==
/// Snapshot of memory accounting, reported in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryUsage {
    /// Estimated size of all entries, in megabytes
    pub current: f64,
    /// Configured ceiling in megabytes, None = unbounded
    pub max: Option<f64>,
    /// Estimated size of all entries, in bytes
    pub current_bytes: usize,
    /// Configured ceiling in bytes, None = unbounded
    pub max_bytes: Option<usize>,
}

impl MemoryUsage {
    pub fn new(current_bytes: usize, max_bytes: Option<usize>) -> Self {
        Self {
            current: current_bytes as f64 / BYTES_PER_MB,
            max: max_bytes.map(|bytes| bytes as f64 / BYTES_PER_MB),
            current_bytes,
            max_bytes,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_evictions_and_expirations() {
        let mut stats = CacheStats::new();
        stats.record_evictions(2);
        stats.record_evictions(1);
        stats.record_expirations(5);
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.expirations, 5);
    }

    #[test]
    fn test_memory_counter_never_negative() {
        let mut memory = MemoryCounter::new(None);
        memory.add(10);
        memory.sub(25);
        assert_eq!(memory.current(), 0);
    }

    #[test]
    fn test_memory_counter_exceeded() {
        let mut memory = MemoryCounter::new(Some(100));
        memory.add(100);
        assert!(!memory.exceeded());
        memory.add(1);
        assert!(memory.exceeded());

        let mut unbounded = MemoryCounter::new(None);
        unbounded.add(usize::MAX);
        assert!(!unbounded.exceeded());
    }

    #[test]
    fn test_memory_usage_in_megabytes() {
        let usage = MemoryUsage::new(512 * 1024, Some(2 * 1024 * 1024));
        assert_eq!(usage.current, 0.5);
        assert_eq!(usage.max, Some(2.0));
        assert_eq!(usage.current_bytes, 512 * 1024);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = CacheStats {
            hits: 1,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["expirations"], 0);
    }
}
