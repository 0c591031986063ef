//! Collaborator interfaces consumed by the search core, and the adapters shipped
//! with the crate.
//!
//! - [`Embedder`]: text to fixed-length vector
//! - [`SimilaritySearch`]: vector similarity query with filters and a score floor
//! - [`LexicalSearch`]: keyword relevance query
//! - [`RecipeSource`]: recipe rows for the embedding pipeline
//! - [`VectorSink`]: persistence of computed vectors
//!
//! The core only sees these traits through `Arc<dyn _>` handles, so tests can swap
//! in doubles and production can point them at real services.

pub mod cache;
pub mod hashing;
pub mod memory;

pub use cache::CachedEmbedder;
pub use hashing::HashingEmbedder;
pub use memory::InMemoryCatalog;

use crate::error::BackendError;
use crate::search::FilterSet;
use crate::types::{Recipe, RecipeId};
use async_trait::async_trait;

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;

    /// Embed several texts. Output order matches input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// One similarity query.
#[derive(Debug, Clone)]
pub struct SimilarityQuery {
    pub vector: Vec<f32>,
    pub filters: FilterSet,
    /// Hard floor: hits below this similarity are never returned.
    pub min_score: f32,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityHit {
    pub recipe: Recipe,
    pub similarity: f32,
}

/// Vector similarity over approved recipes.
///
/// Implementations apply `filters` before scoring, drop hits below `min_score`,
/// and return at most `limit` hits in their own ranked order.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search(&self, query: SimilarityQuery) -> Result<Vec<SimilarityHit>, BackendError>;
}

/// One keyword query.
#[derive(Debug, Clone)]
pub struct LexicalQuery {
    pub text: String,
    pub filters: FilterSet,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    pub recipe: Recipe,
    pub rank: f32,
}

/// Full-text relevance over approved recipes, best first.
#[async_trait]
pub trait LexicalSearch: Send + Sync {
    async fn search(&self, query: LexicalQuery) -> Result<Vec<LexicalHit>, BackendError>;
}

/// Read access to recipe rows.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// One approved recipe, or `None` when it is missing or not approved.
    async fn fetch_one(&self, id: &RecipeId) -> Result<Option<Recipe>, BackendError>;

    /// Approved recipes matching `filters`.
    async fn fetch_approved(&self, filters: &FilterSet) -> Result<Vec<Recipe>, BackendError>;

    /// Approved recipes that have no stored vector yet.
    async fn fetch_unembedded(&self) -> Result<Vec<Recipe>, BackendError>;
}

/// Write side for computed vectors.
#[async_trait]
pub trait VectorSink: Send + Sync {
    async fn store_embedding(&self, id: &RecipeId, vector: Vec<f32>) -> Result<(), BackendError>;
}
