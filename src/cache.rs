//! Memoization Cache
//! Process-wide map from (function, arguments) to an immutable shared value.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Identity of a memoized call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    func: &'static str,
    args: String,
}

impl CacheKey {
    /// Arguments are keyed by their `Debug` rendering.
    pub fn new(func: &'static str, args: impl Debug) -> Self {
        Self {
            func,
            args: format!("{args:?}"),
        }
    }

    pub fn func(&self) -> &'static str {
        self.func
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

/// Lazily filled, never evicted.
#[derive(Default)]
pub struct Cache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written entry.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value for `key`, if present and of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &CacheKey) -> Option<Arc<T>> {
        let entry = self.lock().get(key).cloned()?;
        entry.downcast::<T>().ok()
    }

    /// Return the cached value for `key` or compute, store and return it.
    ///
    /// The lock is released while `compute` runs, so it may itself use the
    /// cache. Errors are returned without being stored. If two callers race
    /// on the same key the first stored value wins and both get it.
    pub fn get_or_try_insert_with<T, E, F>(&self, key: CacheKey, compute: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(hit) = self.get::<T>(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(func = key.func, args = %key.args, "cache miss");
        let value = Arc::new(compute()?);

        let stored = self
            .lock()
            .entry(key)
            .or_insert_with(|| value.clone() as Entry)
            .clone();
        // A key reused for another type keeps its first value.
        Ok(stored.downcast::<T>().unwrap_or(value))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}
