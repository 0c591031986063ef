//! LRU cache in front of an embedder.

use super::Embedder;
use crate::error::BackendError;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Remembers the most recent text-to-vector results of an inner embedder.
///
/// Errors are never cached.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl std::fmt::Debug for CachedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder")
            .field("dimension", &self.inner.dimension())
            .finish_non_exhaustive()
    }
}

impl CachedEmbedder {
    /// A zero capacity is bumped to 1.
    pub fn new(inner: Arc<dyn Embedder>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        if let Some(vector) = self.cache.lock().await.get(text) {
            tracing::trace!(text, "Embedding cache hit");
            return Ok(vector.clone());
        }

        let vector = self.inner.embed(text).await?;
        self.cache.lock().await.put(text.to_string(), vector.clone());
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        let mut vectors: Vec<Option<Vec<f32>>> = {
            let mut cache = self.cache.lock().await;
            texts.iter().map(|text| cache.get(text).cloned()).collect()
        };

        let misses: Vec<String> = texts
            .iter()
            .zip(&vectors)
            .filter(|(_, cached)| cached.is_none())
            .map(|(text, _)| text.clone())
            .collect();

        if !misses.is_empty() {
            let computed = self.inner.embed_batch(&misses).await?;
            if computed.len() != misses.len() {
                return Err(BackendError::Unavailable(format!(
                    "embedder returned {} vectors for {} texts",
                    computed.len(),
                    misses.len()
                )));
            }

            let mut cache = self.cache.lock().await;
            let mut computed = computed.into_iter();
            for (text, slot) in texts.iter().zip(vectors.iter_mut()) {
                if slot.is_none()
                    && let Some(vector) = computed.next()
                {
                    cache.put(text.clone(), vector.clone());
                    *slot = Some(vector);
                }
            }
        }

        Ok(vectors.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns `[len(text)]` and counts how many texts it was asked to embed.
    #[derive(Default)]
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn dimension(&self) -> usize {
            1
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32])
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_repeated_text_hits_cache() {
        let inner = Arc::new(CountingEmbedder::default());
        let cached = CachedEmbedder::new(inner.clone(), 4);

        let_assert!(Ok(first) = cached.embed("curry").await);
        let_assert!(Ok(second) = cached.embed("curry").await);

        check!(first == second);
        check!(inner.calls.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_batch_mixes_hits_and_misses_in_order() {
        let inner = Arc::new(CountingEmbedder::default());
        let cached = CachedEmbedder::new(inner.clone(), 8);
        let_assert!(Ok(_) = cached.embed("rice").await);

        let texts: Vec<String> = ["stew", "rice", "pho"].iter().map(ToString::to_string).collect();
        let_assert!(Ok(vectors) = cached.embed_batch(&texts).await);

        check!(vectors == vec![vec![4.0], vec![4.0], vec![3.0]]);
        // "rice" came from the cache
        check!(inner.calls.load(Ordering::SeqCst) == 3);
        check!(cached.len().await == 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_capacity_evicts_least_recent() {
        let inner = Arc::new(CountingEmbedder::default());
        let cached = CachedEmbedder::new(inner.clone(), 1);

        let_assert!(Ok(_) = cached.embed("a").await);
        let_assert!(Ok(_) = cached.embed("b").await);
        let_assert!(Ok(_) = cached.embed("a").await);

        check!(inner.calls.load(Ordering::SeqCst) == 3);
    }
}
