//! LRU cache of row index to document

use std::num::NonZeroUsize;
use std::sync::Arc;

use log::trace;
use lru::LruCache;

use crate::model::Document;

/// A cached row lookup result.
///
/// `None` is a remembered absence: the row was looked up and had no document.
pub type CachedRow = Option<Arc<Document>>;

/// Counters describing how a [`RowCache`] has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to go to the store.
    pub misses: u64,
    /// Entries dropped to make room for newer ones.
    pub evictions: u64,
}

/// Bounded least-recently-used map from row index to document.
///
/// Capacity is fixed at construction. Absences are cached like documents so
/// a row that resolved to nothing is not fetched again until it is evicted
/// or the cache is invalidated.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
/// use std::sync::Arc;
/// use docgrid_lib::cache::RowCache;
/// use docgrid_lib::model::Document;
///
/// let mut cache = RowCache::new(NonZeroUsize::new(2).unwrap());
/// cache.store(0, Some(Arc::new(Document::new().set("_id", 1))));
///
/// assert!(cache.lookup(0).is_some());
/// assert!(cache.lookup(1).is_none());
/// ```
#[derive(Debug)]
pub struct RowCache {
    entries: LruCache<usize, CachedRow>,
    stats: CacheStats,
}

impl RowCache {
    /// Creates a new cache holding at most `capacity` rows.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Looks up a row, marking it most recently used.
    ///
    /// The outer `Option` says whether the row is cached at all; the inner
    /// [`CachedRow`] is what was cached.
    pub fn lookup(&mut self, row: usize) -> Option<CachedRow> {
        match self.entries.get(&row) {
            Some(entry) => {
                self.stats.hits += 1;
                trace!("Row cache hit for row {}", row);
                Some(entry.clone())
            }
            None => {
                self.stats.misses += 1;
                trace!("Row cache miss for row {}", row);
                None
            }
        }
    }

    /// Caches the lookup result for a row.
    pub fn store(&mut self, row: usize, entry: CachedRow) {
        // `push` hands back the old entry when `row` was already cached.
        if self.entries.push(row, entry).is_some_and(|(evicted, _)| evicted != row) {
            self.stats.evictions += 1;
        }
    }

    /// Returns `true` if the row is cached, without touching recency.
    pub fn contains(&self, row: usize) -> bool {
        self.entries.contains(&row)
    }

    /// Drops every cached row.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of cached rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of cached rows.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Returns the usage counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
