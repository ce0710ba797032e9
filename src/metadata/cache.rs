//! Cache of the most recently computed metadata items.
//!
//! The cache maps each identifier to the last item its provider produced. Entries are
//! never recomputed here: an upstream change only marks an entry stale, and the
//! [`MetadataService`](super::MetadataService) recomputes it lazily on the next `get`.
//!
//! # Capacity
//!
//! With a capacity configured, inserting beyond it drops the least recently used entry.
//! Dropping is always safe because dependency edges live in the registry, not here; a
//! dropped item is simply recomputed on next access.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use super::identifier::{MetadataId, ProviderTag};
use super::item::MetadataItem;

#[derive(Debug)]
struct CacheEntry {
    item: Arc<MetadataItem>,
    /// Set when an upstream changed after this item was computed.
    stale: bool,
    /// Logical clock value of the last access, for LRU eviction.
    last_used: u64,
}

/// Counters describing cache and engine activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// `get` calls answered from the cache
    pub hits: u64,
    /// `get` calls that had to compute
    pub misses: u64,
    /// Provider invocations
    pub computations: u64,
    /// Entries marked stale by notifications
    pub invalidations: u64,
    /// Entries dropped to honor the capacity bound
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage of all lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Identifier -> most recently computed item.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<MetadataId, CacheEntry>,
    capacity: Option<usize>,
    clock: u64,
    stats: CacheStats,
}

impl MetadataCache {
    /// Create an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    /// Return the cached item if it is fresh and valid, recording a hit or a miss.
    pub fn fresh(&mut self, id: &MetadataId) -> Option<Arc<MetadataItem>> {
        self.clock += 1;
        let clock = self.clock;
        match self.entries.get_mut(id) {
            Some(entry) if !entry.stale && entry.item.is_valid() => {
                entry.last_used = clock;
                self.stats.hits += 1;
                Some(Arc::clone(&entry.item))
            }
            _ => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// The cached item regardless of freshness, without touching statistics.
    pub fn peek(&self, id: &MetadataId) -> Option<&Arc<MetadataItem>> {
        self.entries.get(id).map(|e| &e.item)
    }

    /// Store a freshly computed item, replacing any previous one.
    pub fn insert(&mut self, item: Arc<MetadataItem>) {
        self.clock += 1;
        let id = item.id().clone();
        self.entries.insert(
            id,
            CacheEntry {
                item,
                stale: false,
                last_used: self.clock,
            },
        );
        self.enforce_capacity();
    }

    /// Mark an entry stale. Returns true if a fresh entry was invalidated.
    pub fn mark_stale(&mut self, id: &MetadataId) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if !entry.stale => {
                entry.stale = true;
                self.stats.invalidations += 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_stale(&self, id: &MetadataId) -> bool {
        self.entries.get(id).is_some_and(|e| e.stale)
    }

    /// Drop an entry entirely.
    pub fn remove(&mut self, id: &MetadataId) -> Option<Arc<MetadataItem>> {
        self.entries.remove(id).map(|e| e.item)
    }

    /// Drop every entry whose identifier carries `tag`, returning how many were dropped.
    pub fn remove_tag(&mut self, tag: &ProviderTag) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| id.provider_tag() != tag);
        before - self.entries.len()
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn record_computation(&mut self) {
        self.stats.computations += 1;
    }

    fn enforce_capacity(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.entries.len() > capacity {
            let Some(oldest) =
                self.entries.iter().min_by_key(|(_, e)| e.last_used).map(|(id, _)| id.clone())
            else {
                break;
            };
            trace!("Evicting least recently used metadata {}", oldest);
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
        }
    }
}
