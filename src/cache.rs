// Copyright 2025 Cowboy AI, LLC.

//! Memoized application: one derived class per (base, extension)

use crate::class::{Class, WeakClass};
use crate::errors::MixinResult;
use crate::extension::{unwrap, wrap, Extension};
use crate::identifiers::ExtensionId;
use crate::tags::Marker;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// What a cache entry is keyed by
///
/// The canonical extension alone is not enough: a cached raw extension and
/// a cached stamped application of the same extension produce different
/// classes, and must not hand each other's result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Canonical identity of the extension
    pub extension: ExtensionId,
    /// Whether the cached layer stamps what it produces
    pub stamped: bool,
}

impl CacheKey {
    /// The key under which `extension`'s applications are cached
    pub fn of(extension: &Extension) -> Self {
        Self {
            extension: unwrap(extension).id(),
            stamped: extension.stamps(),
        }
    }
}

/// Applications of extensions to one base class
///
/// Each key owns a slot with its own lock. The map lock is only held while
/// the slot is fetched, so an extension body may apply other extensions to
/// the same base while its own slot is being filled. Concurrent first use
/// of a key blocks on the slot and sees the single winner.
///
/// Slots hold derived classes weakly. A derived class links to its base,
/// so a strong slot would keep the base alive through its own cache. An
/// entry stays valid as long as anything still holds the derived class;
/// once nothing does, the next application builds a fresh one.
pub struct CacheTable {
    entries: DashMap<CacheKey, Arc<Mutex<WeakClass>>>,
}

impl CacheTable {
    /// Create an empty cache table
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The cached application for `key`, if it is still alive
    pub fn get(&self, key: CacheKey) -> Option<Class> {
        let slot = self.entries.get(&key).map(|entry| Arc::clone(entry.value()))?;
        let class = slot.lock().upgrade();
        class
    }

    /// Check whether a live application for `key` is cached
    pub fn contains(&self, key: CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Return the cached class for `key`, producing it with `init` if needed
    ///
    /// A failing `init` leaves the slot empty, so a later call retries.
    pub fn get_or_try_insert_with<F>(&self, key: CacheKey, init: F) -> MixinResult<Class>
    where
        F: FnOnce() -> MixinResult<Class>,
    {
        let slot = Arc::clone(self.entries.entry(key).or_default().value());
        let mut cached = slot.lock();
        if let Some(class) = cached.upgrade() {
            return Ok(class);
        }
        let class = init()?;
        *cached = class.downgrade();
        Ok(class)
    }

    /// Number of live cached applications
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().lock().upgrade().is_some())
            .count()
    }

    /// Check if nothing live is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CacheTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheTable").field("len", &self.len()).finish()
    }
}

/// The cache table owned by `base`, created on first use
pub fn cache_table(base: &Class) -> Arc<CacheTable> {
    base.caches()
        .tag_with(Marker::cache(), || Arc::new(CacheTable::new()))
}

/// Decorate `extension` so each base gets exactly one derived class from it
///
/// Repeat applications to the same base return the stored class without
/// running the body again. The inner extension is invoked as-is.
pub fn cached(extension: Extension) -> Extension {
    let inner = extension.clone();
    let key = CacheKey::of(&extension);
    let variant = Extension::new(move |base: &Class| {
        let table = cache_table(base);
        if let Some(hit) = table.get(key) {
            trace!(base = %base.name(), extension = %inner.name(), "Cache hit");
            return Ok(hit);
        }
        table.get_or_try_insert_with(key, || {
            debug!(base = %base.name(), extension = %inner.name(), "Cache miss, applying");
            inner.invoke(base)
        })
    });
    wrap(&extension, variant)
}
