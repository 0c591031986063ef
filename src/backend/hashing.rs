//! Deterministic feature-hashing embedder.
//!
//! Stemmed terms and adjacent term pairs are hashed into a fixed number of signed
//! buckets and the result is L2-normalized. No model download, no network; texts
//! sharing vocabulary land close together under cosine similarity.

use super::Embedder;
use crate::error::BackendError;
use crate::search::tokenize::{Tokenizer, hash_term};
use async_trait::async_trait;

/// Weight of an adjacent term pair relative to a single term.
const PAIR_WEIGHT: f32 = 0.5;

pub struct HashingEmbedder {
    dimension: usize,
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for HashingEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingEmbedder")
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl HashingEmbedder {
    /// A zero dimension is bumped to 1.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            tokenizer: Tokenizer::default(),
        }
    }

    fn add(&self, vector: &mut [f32], hash: u64, weight: f32) {
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    /// Embed synchronously; the async trait methods delegate here.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        let tokens = self.tokenizer.tokens(text);

        for token in &tokens {
            self.add(&mut vector, hash_term(token), 1.0);
        }
        for pair in tokens.windows(2) {
            self.add(&mut vector, hash_term(&format!("{} {}", pair[0], pair[1])), PAIR_WEIGHT);
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
