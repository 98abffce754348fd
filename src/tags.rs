// Copyright 2025 Cowboy AI, LLC.

//! Identity tags: opaque markers and the side tables that hold them
//!
//! Classes, templates and extensions cannot grow ad hoc fields, so each of
//! them owns a [`TagStore`] keyed by [`Marker`]. A marker is an unguessable
//! token; holding it is the only way to read or write the slot.
//!
//! ```mermaid
//! graph LR
//!     T[Template] -->|applied marker| E[ExtensionId]
//!     X[Extension] -->|wrapped marker| O[innermost Extension]
//!     C[Class] -->|cache marker| M[CacheTable]
//! ```

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The role a marker plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// On a produced template, names the extension that produced it
    Applied,
    /// On an extension, names the innermost original it decorates
    Wrapped,
    /// On a base class, holds its memoized applications
    Cache,
    /// Minted by a caller for its own bookkeeping
    Custom,
}

/// An opaque, globally unique tag key
///
/// Two markers are equal only if they are copies of the same token, so a
/// freshly minted marker can never collide with the library's own.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker {
    token: Uuid,
    kind: MarkerKind,
}

static APPLIED: Lazy<Marker> = Lazy::new(|| Marker::new(MarkerKind::Applied));
static WRAPPED: Lazy<Marker> = Lazy::new(|| Marker::new(MarkerKind::Wrapped));
static CACHE: Lazy<Marker> = Lazy::new(|| Marker::new(MarkerKind::Cache));

impl Marker {
    /// Mint a new marker of the given kind
    pub fn new(kind: MarkerKind) -> Self {
        Self {
            token: Uuid::new_v4(),
            kind,
        }
    }

    /// The marker stamped on templates produced by an application
    pub fn applied() -> Self {
        *APPLIED
    }

    /// The marker linking a wrapper to its innermost original
    pub fn wrapped() -> Self {
        *WRAPPED
    }

    /// The marker holding a base class's cache table
    pub fn cache() -> Self {
        *CACHE
    }

    /// Role of this marker
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }
}

impl fmt::Debug for Marker {
    // The token stays hidden; it is the capability to read the slot.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marker").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Write-once side table of marker → value
///
/// Slots are set at most once. Re-tagging an occupied slot leaves it as it
/// was and hands back the value already there.
pub struct TagStore<V> {
    tags: DashMap<Marker, V>,
}

const MIN_SHARDS: usize = 2;

impl<V: Clone> TagStore<V> {
    /// Create an empty tag store
    ///
    /// Stores hold a handful of markers each and one exists per class and
    /// extension, so the map uses the fewest shards `DashMap` allows.
    pub fn new() -> Self {
        Self {
            tags: DashMap::with_shard_amount(MIN_SHARDS),
        }
    }

    /// Set `marker` to `value` unless it is already set
    ///
    /// Returns the value now stored under the marker.
    pub fn tag(&self, marker: Marker, value: V) -> V {
        self.tags.entry(marker).or_insert(value).clone()
    }

    /// Like [`TagStore::tag`], building the value only when the slot is empty
    ///
    /// `init` runs while the slot is locked and must not touch this store.
    pub fn tag_with<F>(&self, marker: Marker, init: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.tags.entry(marker).or_insert_with(init).clone()
    }

    /// Read the value stored under `marker`, if any
    pub fn read_tag(&self, marker: &Marker) -> Option<V> {
        self.tags.get(marker).map(|entry| entry.value().clone())
    }

    /// Check whether `marker` is set
    pub fn contains(&self, marker: &Marker) -> bool {
        self.tags.contains_key(marker)
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<V: Clone> Default for TagStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TagStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<MarkerKind> = self.tags.iter().map(|entry| entry.key().kind()).collect();
        f.debug_struct("TagStore").field("markers", &kinds).finish()
    }
}
