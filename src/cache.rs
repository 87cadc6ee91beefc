//! Bounded cache for expensive per-shape precomputations.
//!
//! The Spergel profile's normalization constants require root solves and
//! Bessel evaluations that depend only on the index `nu`, so instances with
//! the same index share one precomputed object. The cache is a bounded LRU
//! keyed by the quantized shape parameter; values are handed out as `Arc`s,
//! so an entry evicted while still referenced stays alive for its holders.
//!
//! Concurrency contract: callers computing the same key collapse to a
//! single computation (the first caller runs it, later callers block on the
//! cell until it is filled), while callers on distinct keys only contend on
//! the short-lived map lock, never on each other's computation.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

/// Bounded, single-flight, least-recently-used cache.
pub struct ProfileCache<K: Hash + Eq, V> {
    map: Mutex<LruCache<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K: Hash + Eq + Clone, V> ProfileCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).expect("cache capacity must be nonzero"),
            )),
        }
    }

    /// Fetch the value for `key`, computing it with `init` on a miss.
    ///
    /// `init` runs outside the map lock. If it fails, the slot is left
    /// empty and the error is returned; a later caller for the same key
    /// will run the (deterministic) computation again and observe the same
    /// failure.
    pub fn get_or_try_insert<E>(
        &self,
        key: K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let cell = {
            let mut map = self.map.lock();
            map.get_or_insert(key, || Arc::new(OnceCell::new())).clone()
        };
        let value = cell.get_or_try_init(|| init().map(Arc::new))?;
        Ok(Arc::clone(value))
    }

    /// Number of entries currently resident (filled or in flight).
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    /// True when no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
