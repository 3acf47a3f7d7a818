//! Cache Store Module
//!
//! Main cache engine combining a recency-ordered entry store with an expiry
//! index, a single expiry timer and deferred, coalesced pruning.
//!
//! All state lives behind `Rc<RefCell<_>>` and every follow-up task runs on
//! the same `LocalSet`, so public calls and deferred work never interleave
//! mid-update.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use lru::LruCache;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{
    CacheEntry, CacheStats, Expiry, ExpiryIndex, MemoryCounter, MemoryUsage, SizeEstimate, Ttl,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{defer, ExpiryTimer};

// == Cache ==
/// Bounded key/value cache with LRU ordering, per-entry TTL and a memory
/// budget.
///
/// Writes never evict synchronously: limits are enforced by a prune pass
/// queued behind the write, so callers can briefly observe an overshoot.
/// Expired entries read as absent immediately and are physically removed when
/// the expiry timer fires.
///
/// Must be created and used from within a [`tokio::task::LocalSet`].
pub struct Cache<K, V> {
    inner: Rc<RefCell<CacheStore<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: SizeEstimate + 'static,
{
    // == Constructor ==
    /// Creates a cache after validating `config`.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Cache created: ttl={:?}, max_items={:?}, max_memory_in_mb={:?}",
            config.ttl, config.max_items, config.max_memory_in_mb
        );
        let inner = Rc::new_cyclic(|this| RefCell::new(CacheStore::new(&config, this.clone())));
        Ok(Self { inner })
    }

    // == Set ==
    /// Stores `value` under `key` with the configured default TTL.
    ///
    /// Any previous entry for `key` is removed first; the write is a full
    /// replacement, never a merge.
    ///
    /// # Panics
    /// Panics if called outside of a `LocalSet` when the write has to queue
    /// follow-up work (a finite TTL or an exceeded limit).
    pub fn set(&self, key: K, value: V) {
        let mut store = self.inner.borrow_mut();
        let ttl = store.default_ttl;
        store.set(key, value, ttl);
    }

    /// Stores `value` under `key` with an explicit TTL.
    ///
    /// A zero-length TTL is rejected instead of expiring immediately.
    ///
    /// # Panics
    /// Panics if called outside of a `LocalSet` when the write has to queue
    /// follow-up work (a finite TTL or an exceeded limit).
    pub fn set_with_ttl(&self, key: K, value: V, ttl: impl Into<Ttl>) -> Result<()> {
        let ttl = ttl.into();
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(
                "TTL must be greater than zero".to_string(),
            ));
        }
        self.inner.borrow_mut().set(key, value, ttl);
        Ok(())
    }

    // == Get ==
    /// Returns a clone of the live value for `key`, marking it most recently
    /// used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.borrow_mut().get(key)
    }

    // == Has ==
    /// Returns true if `key` holds a live value. Does not touch recency.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        RefCell::borrow(&self.inner).has(key)
    }

    // == Delete ==
    /// Removes `key`. Returns false if nothing was stored.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.borrow_mut().delete(key)
    }

    // == Clear ==
    /// Drops every entry and cancels the expiry timer.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    /// Number of stored entries, including expired ones not yet reaped.
    pub fn size(&self) -> usize {
        RefCell::borrow(&self.inner).entries.len()
    }

    /// Memory accounting snapshot.
    pub fn memory(&self) -> MemoryUsage {
        RefCell::borrow(&self.inner).memory.usage()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let store = RefCell::borrow(&self.inner);
        let mut stats = store.stats.clone();
        stats.total_entries = store.entries.len();
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

// == Cache Store ==
/// Mutable state shared between the public handle and its deferred tasks.
pub(crate) struct CacheStore<K, V> {
    /// Entries in recency order, least recently used first
    entries: LruCache<K, CacheEntry<V>>,
    /// Keys with a finite expiry, bucketed by instant
    expiries: ExpiryIndex<K>,
    /// The one wake-up armed for the earliest expiry
    timer: ExpiryTimer,
    memory: MemoryCounter,
    stats: CacheStats,
    default_ttl: Ttl,
    max_items: Option<usize>,
    /// A prune pass is queued but has not started
    prune_pending: bool,
    #[cfg(test)]
    prune_passes: usize,
    /// Handle given to deferred tasks
    this: Weak<RefCell<CacheStore<K, V>>>,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone + 'static,
    V: SizeEstimate + 'static,
{
    fn new(config: &CacheConfig, this: Weak<RefCell<Self>>) -> Self {
        Self {
            entries: LruCache::unbounded(),
            expiries: ExpiryIndex::new(),
            timer: ExpiryTimer::new(),
            memory: MemoryCounter::new(config.max_memory_bytes()),
            stats: CacheStats::new(),
            default_ttl: config.ttl,
            max_items: config.max_items,
            prune_pending: false,
            #[cfg(test)]
            prune_passes: 0,
            this,
        }
    }

    /// Queues `task` against this store; skipped if the cache was dropped.
    fn defer_with<F>(&self, task: F)
    where
        F: FnOnce(&mut Self) + 'static,
    {
        let this = self.this.clone();
        defer(move || {
            if let Some(store) = this.upgrade() {
                task(&mut store.borrow_mut());
            }
        });
    }

    fn set(&mut self, key: K, value: V, ttl: Ttl) {
        self.delete(&key);

        let size = value.estimated_size();
        let expires_at = Expiry::from_ttl(Instant::now(), ttl);

        self.entries
            .put(key.clone(), CacheEntry::new(value, size, expires_at));
        self.memory.add(size);

        if let Expiry::At(at) = expires_at {
            self.defer_with(move |store| store.register_expiry(key, at));
        }

        if self.over_limits() && !self.prune_pending {
            self.prune_pending = true;
            self.defer_with(Self::prune);
        }
    }

    fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        if !self.has(key) {
            self.stats.record_miss();
            return None;
        }
        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.entries
            .peek(key)
            .is_some_and(|entry| entry.is_live_at(now))
    }

    fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(entry) = self.entries.pop(key) else {
            return false;
        };
        self.memory.sub(entry.size);
        if let Expiry::At(at) = entry.expires_at {
            self.unregister_expiry(at, key);
        }
        true
    }

    fn clear(&mut self) {
        self.timer.cancel();
        self.entries.clear();
        self.expiries.clear();
        self.memory.reset();
    }

    // == Expiry Bookkeeping ==
    /// Adds `key` to the expiry index if its entry still expires at `at`.
    ///
    /// Runs deferred, so the key may have been deleted or replaced since the
    /// write that queued it.
    fn register_expiry(&mut self, key: K, at: Instant) {
        let current = self.entries.peek(&key).map(|entry| entry.expires_at);
        if current != Some(Expiry::At(at)) {
            return;
        }
        self.expiries.insert(at, key);
        if self.timer.armed_at().map_or(true, |armed| at < armed) {
            self.rearm();
        }
    }

    fn unregister_expiry<Q>(&mut self, at: Instant, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.expiries.remove_key(at, key) && self.timer.armed_at() == Some(at) {
            self.rearm();
        }
    }

    /// Points the timer at the earliest tracked expiry, or disarms it.
    fn rearm(&mut self) {
        match self.expiries.peek_min().map(|(at, _)| at) {
            Some(at) => {
                let this = self.this.clone();
                self.timer.arm(at, move || {
                    if let Some(store) = this.upgrade() {
                        store.borrow_mut().on_expire();
                    }
                });
            }
            None => self.timer.cancel(),
        }
    }

    // == Reaping ==
    /// Timer callback: removes every entry whose expiry has passed.
    fn on_expire(&mut self) {
        self.timer.fired();
        let now = Instant::now();
        let mut reaped = 0;

        while self.expiries.peek_min().is_some_and(|(at, _)| at <= now) {
            let Some((at, keys)) = self.expiries.pop_min() else {
                break;
            };
            for key in keys {
                let due = self
                    .entries
                    .peek(&key)
                    .is_some_and(|entry| entry.expires_at == Expiry::At(at));
                if !due {
                    continue;
                }
                if let Some(entry) = self.entries.pop(&key) {
                    self.memory.sub(entry.size);
                    reaped += 1;
                }
            }
        }

        self.stats.record_expirations(reaped);
        debug!(
            reaped,
            remaining = self.entries.len(),
            "TTL reap: removed expired entries"
        );
        self.rearm();
    }

    // == Pruning ==
    fn over_limits(&self) -> bool {
        self.max_items
            .is_some_and(|max| self.entries.len() > max)
            || self.memory.exceeded()
    }

    /// Evicts least recently used entries until both limits hold.
    fn prune(&mut self) {
        self.prune_pending = false;
        #[cfg(test)]
        {
            self.prune_passes += 1;
        }
        let mut evicted = 0;

        while self.over_limits() {
            let Some((key, entry)) = self.entries.pop_lru() else {
                break;
            };
            self.memory.sub(entry.size);
            if let Expiry::At(at) = entry.expires_at {
                self.unregister_expiry(at, &key);
            }
            evicted += 1;
        }

        if evicted > 0 {
            self.stats.record_evictions(evicted);
            debug!(
                evicted,
                remaining = self.entries.len(),
                memory_bytes = self.memory.current(),
                "Prune: evicted least recently used entries"
            );
        }
    }
}
