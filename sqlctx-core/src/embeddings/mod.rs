//! # Embedding Service
//!
//! Wraps a provider behind a cache so that repeated text is embedded at most
//! once per cache TTL window.
//!
//! Two provider variants share the same [`EmbeddingProvider`] capability:
//! [`OfflineProjector`], always available, and [`HttpEmbeddingProvider`]
//! behind the `http` feature.

mod cache;
pub mod offline;

#[cfg(feature = "http")]
pub mod http;

pub use cache::{CacheStats, EmbeddingCache};
pub use offline::OfflineProjector;

#[cfg(feature = "http")]
pub use http::{HttpEmbeddingProvider, ModelManager};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Converts text to a fixed-dimension vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text, failing if the provider is unreachable or
    /// returns a vector whose length doesn't match `dimension()`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch, preserving input order. The default implementation
    /// embeds sequentially; providers that can parallelize safely may
    /// override this as long as order is preserved.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Fixed output dimension D this provider produces.
    fn dimension(&self) -> usize;
}

/// Wraps an [`EmbeddingProvider`] with an LRU+TTL cache keyed by text hash.
pub struct EmbeddingService {
    provider: Box<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
}

impl EmbeddingService {
    #[must_use]
    pub fn new(provider: Box<dyn EmbeddingProvider>, cache: EmbeddingCache) -> Self {
        Self { provider, cache }
    }

    /// Embeds `text`, serving from cache when a materialized hit exists.
    ///
    /// Concurrent misses for the same text may issue duplicate provider
    /// calls; the last `put` wins, never corrupting the cache.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached);
        }
        let vector = self.provider.embed(text).await?;
        if vector.len() != self.provider.dimension() {
            return Err(Error::EmbeddingProvider(format!(
                "provider returned dimension {}, expected {}",
                vector.len(),
                self.provider.dimension()
            )));
        }
        self.cache.put(text, vector.clone());
        Ok(vector)
    }

    /// Embeds a batch, preserving order, consulting the cache per-entry.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        dim: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0; self.dim])
        }

        fn dimension(&self) -> usize {
            self.dim
        }
    }

    #[tokio::test]
    async fn repeated_embed_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            calls: calls.clone(),
            dim: 8,
        };
        let service = EmbeddingService::new(Box::new(provider), EmbeddingCache::default());

        service.embed("same text").await.unwrap();
        for _ in 0..10 {
            service.embed("same text").await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = service.stats();
        assert_eq!(stats.hits, 10);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn high_concurrency_hit_rate_after_warmup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            calls: calls.clone(),
            dim: 4,
        };
        let service = Arc::new(EmbeddingService::new(
            Box::new(provider),
            EmbeddingCache::new(10, Duration::from_secs(60)),
        ));

        service.embed("warm").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..100 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.embed("warm").await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let stats = service.stats();
        assert!(stats.hits >= 90, "hits = {}", stats.hits);
        assert_eq!(stats.size, 1);
    }

    struct WrongDimensionProvider;

    #[async_trait]
    impl EmbeddingProvider for WrongDimensionProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.0; 3])
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    #[tokio::test]
    async fn dimension_mismatch_is_an_error() {
        let service = EmbeddingService::new(
            Box::new(WrongDimensionProvider),
            EmbeddingCache::default(),
        );
        assert!(service.embed("x").await.is_err());
    }
}
