//! Parsed-formula cache keyed by source text

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use lru::LruCache;
use tracing::debug;

use super::Formula;
use crate::error::Result;

enum Store {
    Unbounded(HashMap<String, Arc<Formula>>),
    Bounded(LruCache<String, Arc<Formula>>),
}

impl Store {
    fn get(&mut self, source: &str) -> Option<Arc<Formula>> {
        match self {
            Store::Unbounded(map) => map.get(source).cloned(),
            Store::Bounded(lru) => lru.get(source).cloned(),
        }
    }

    fn insert(&mut self, source: &str, parsed: Arc<Formula>) -> Arc<Formula> {
        match self {
            Store::Unbounded(map) => Arc::clone(map.entry(source.to_string()).or_insert(parsed)),
            Store::Bounded(lru) => Arc::clone(lru.get_or_insert(source.to_string(), || parsed)),
        }
    }

    fn len(&self) -> usize {
        match self {
            Store::Unbounded(map) => map.len(),
            Store::Bounded(lru) => lru.len(),
        }
    }
}

/// Shares one parsed [`Formula`] per distinct source text.
///
/// The default cache keeps every formula, which suits a catalog load where
/// the set of texts is fixed. [`FormulaCache::bounded`] keeps only the most
/// recently used ones, for caches fed with arbitrary caller formulas.
pub struct FormulaCache {
    inner: RwLock<Store>,
}

impl FormulaCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Store::Unbounded(HashMap::new())),
        }
    }

    /// Cache holding at most `capacity` formulas (at least one), evicting the
    /// least recently used.
    pub fn bounded(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(Store::Bounded(LruCache::new(cap))),
        }
    }

    /// Return the cached formula for `source`, parsing it on first use.
    ///
    /// Parse failures are not cached.
    pub fn get_or_parse(&self, source: &str) -> Result<Arc<Formula>> {
        if let Some(hit) = self.write().get(source) {
            return Ok(hit);
        }

        debug!(formula = source, "parsing formula");
        let parsed = Arc::new(Formula::parse(source)?);
        Ok(self.write().insert(source, parsed))
    }

    /// Maximum number of cached formulas, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        match &*self.inner.read().unwrap_or_else(|e| e.into_inner()) {
            Store::Unbounded(_) => None,
            Store::Bounded(lru) => Some(lru.cap().get()),
        }
    }

    /// Number of cached formulas.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // lookups reorder the LRU list, so even hits need the write lock
    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        // entries are immutable once inserted, so a poisoned lock is still usable
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FormulaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormulaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
