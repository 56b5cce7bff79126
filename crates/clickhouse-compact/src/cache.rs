//! Resolved descriptor LRU cache.
//!
//! Responses of the same query report the same column declarations over and
//! over. Caching the resolved [`TypeDescriptor`] by declaration text skips
//! parsing and resolution for every repeat.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::Result;
use crate::types::TypeDescriptor;

#[derive(Debug)]
struct CacheState {
    entries: LruCache<String, Arc<TypeDescriptor>>,
    hits: u64,
    misses: u64,
}

/// Thread-safe LRU cache from declaration text to resolved descriptor.
///
/// Descriptors are immutable, so a cached descriptor can be handed to any
/// number of concurrent decode calls.
#[derive(Debug)]
pub struct DescriptorCache {
    state: Mutex<CacheState>,
}

impl DescriptorCache {
    /// Create a cache holding at most `capacity` descriptors.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Maximum number of cached descriptors.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }

    /// Number of cached descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Returns true if `declaration` is cached, without touching recency.
    #[must_use]
    pub fn contains(&self, declaration: &str) -> bool {
        self.state.lock().entries.peek(declaration).is_some()
    }

    /// Number of lookups served from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.state.lock().hits
    }

    /// Number of lookups that had to resolve.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.state.lock().misses
    }

    /// Fraction of lookups served from the cache, `0.0` before any lookup.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let state = self.state.lock();
        let total = state.hits + state.misses;
        if total == 0 {
            0.0
        } else {
            state.hits as f64 / total as f64
        }
    }

    /// Return the cached descriptor for `declaration`, resolving and caching
    /// it with `resolve` on a miss.
    ///
    /// The lock is not held while `resolve` runs. Failed resolutions are not
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns the error of `resolve`.
    pub fn get_or_try_insert<F>(&self, declaration: &str, resolve: F) -> Result<Arc<TypeDescriptor>>
    where
        F: FnOnce() -> Result<TypeDescriptor>,
    {
        {
            let mut state = self.state.lock();
            if let Some(descriptor) = state.entries.get(declaration).cloned() {
                state.hits += 1;
                trace!(declaration, "Descriptor cache hit");
                return Ok(descriptor);
            }
            state.misses += 1;
        }

        trace!(declaration, "Descriptor cache miss");
        let descriptor = Arc::new(resolve()?);
        self.state
            .lock()
            .entries
            .push(declaration.to_owned(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }
}
