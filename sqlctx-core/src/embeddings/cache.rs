//! LRU + TTL cache for embedding vectors, keyed by a stable hash of the input text.
//!
//! An `Arc<RwLock<LruCache<..>>>` plus a side metrics struct, caching
//! embedding vectors keyed by a hash of their input text.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::constants::{DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL};

struct CachedEmbedding {
    vector: Vec<f32>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedEmbedding {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Snapshot of cache performance, exposed via `EmbeddingService::stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe embedding cache with LRU eviction and lazy TTL expiry.
///
/// Lookups never block on an in-flight miss for the same key: a concurrent
/// miss simply recomputes and overwrites on `put` (last writer wins), which
/// matches the at-most-one-materialized-hit guarantee required of the cache
/// without needing a per-key mutex.
pub struct EmbeddingCache {
    cache: Arc<RwLock<LruCache<u64, CachedEmbedding>>>,
    default_ttl: Duration,
    stats: Arc<RwLock<CacheStats>>,
}

impl EmbeddingCache {
    #[must_use]
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_size)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_MAX_SIZE).unwrap());
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            default_ttl: ttl,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    fn key_for(text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    }

    /// Returns a cache hit only if a materialized, non-expired entry exists.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        let key = Self::key_for(text);
        let mut cache = self.cache.write().expect("embedding cache lock poisoned");
        let mut stats = self.stats.write().expect("embedding cache stats lock poisoned");

        match cache.get(&key) {
            Some(entry) if entry.is_expired() => {
                cache.pop(&key);
                stats.misses += 1;
                stats.size = cache.len();
                None
            }
            Some(entry) => {
                stats.hits += 1;
                Some(entry.vector.clone())
            }
            None => {
                stats.misses += 1;
                stats.size = cache.len();
                None
            }
        }
    }

    pub fn put(&self, text: &str, vector: Vec<f32>) {
        let key = Self::key_for(text);
        let mut cache = self.cache.write().expect("embedding cache lock poisoned");
        cache.put(
            key,
            CachedEmbedding {
                vector,
                cached_at: Instant::now(),
                ttl: self.default_ttl,
            },
        );
        let mut stats = self.stats.write().expect("embedding cache stats lock poisoned");
        stats.size = cache.len();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.read().expect("embedding cache stats lock poisoned")
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL)
    }
}
