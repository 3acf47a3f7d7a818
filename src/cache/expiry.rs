//! Expiry Index Module
//!
//! Ordered index from absolute expiry instant to the keys expiring then.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use tokio::time::Instant;

// == Expiry Index ==
/// Buckets of keys keyed by expiry instant.
///
/// Backed by a `BTreeMap` so the earliest bucket is found and removed in
/// logarithmic time. Empty buckets are never kept.
#[derive(Debug)]
pub struct ExpiryIndex<K> {
    buckets: BTreeMap<Instant, HashSet<K>>,
}

impl<K: Hash + Eq> ExpiryIndex<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }

    // == Insert ==
    /// Adds `key` to the bucket for `at`, creating the bucket if needed.
    pub fn insert(&mut self, at: Instant, key: K) {
        self.buckets.entry(at).or_default().insert(key);
    }

    // == Remove Key ==
    /// Removes `key` from the bucket for `at`.
    ///
    /// Returns true if the bucket became empty and was dropped.
    pub fn remove_key<Q>(&mut self, at: Instant, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(bucket) = self.buckets.get_mut(&at) else {
            return false;
        };
        if !bucket.remove(key) || !bucket.is_empty() {
            return false;
        }
        self.buckets.remove(&at);
        true
    }

    // == Peek Min ==
    /// Returns the earliest bucket without removing it.
    pub fn peek_min(&self) -> Option<(Instant, &HashSet<K>)> {
        self.buckets.first_key_value().map(|(at, keys)| (*at, keys))
    }

    // == Pop Min ==
    /// Removes and returns the earliest bucket.
    pub fn pop_min(&mut self) -> Option<(Instant, HashSet<K>)> {
        self.buckets.pop_first()
    }

    /// Returns true if `key` is tracked under `at`.
    #[cfg(test)]
    pub fn contains<Q>(&self, at: Instant, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets
            .get(&at)
            .is_some_and(|bucket| bucket.contains(key))
    }

    /// Number of distinct expiry instants.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of tracked keys across all buckets.
    #[cfg(test)]
    pub fn key_count(&self) -> usize {
        self.buckets.values().map(HashSet::len).sum()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl<K: Hash + Eq> Default for ExpiryIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
