//! Cache adapter abstraction and the in-process backends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::error::CacheError;

/// Key/value store for cache entries.
///
/// Each call is atomic on its own; callers get no transaction across a
/// read-decide-write sequence.
pub trait CacheAdapter: Send + Sync {
    /// Get the entry stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss and [`CacheError::Corrupt`] when the stored
    /// value cannot be read back as an entry.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Store `entry` under `key`, expiring it after `ttl` when given.
    fn set(&self, key: &str, entry: CacheEntry, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove the entry stored under `key`. Removing a missing key is not an error.
    fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

impl<T: CacheAdapter + ?Sized> CacheAdapter for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, entry: CacheEntry, ttl: Option<Duration>) -> Result<(), CacheError> {
        (**self).set(key, entry, ttl)
    }

    fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        (**self).invalidate(key)
    }
}

struct Slot {
    entry: CacheEntry,
    evict_at: Option<DateTime<Utc>>,
}

/// In-memory cache with per-key TTL.
pub struct MemoryCache {
    slots: Mutex<HashMap<String, Slot>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // An entry map is still consistent after a panic elsewhere
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Keys currently stored, expired ones included until next touched.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.slots().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }
}

impl CacheAdapter for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let now = self.clock.now();
        let mut slots = self.slots();
        if slots
            .get(key)
            .is_some_and(|slot| slot.evict_at.is_some_and(|at| now >= at))
        {
            slots.remove(key);
            return Ok(None);
        }
        Ok(slots.get(key).map(|slot| slot.entry.clone()))
    }

    fn set(&self, key: &str, entry: CacheEntry, ttl: Option<Duration>) -> Result<(), CacheError> {
        let evict_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl));
        self.slots().insert(key.to_string(), Slot { entry, evict_at });
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.slots().remove(key);
        Ok(())
    }
}

/// A cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CacheAdapter for NoCache {
    fn get(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _entry: CacheEntry, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Ok(())
    }

    fn invalidate(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
