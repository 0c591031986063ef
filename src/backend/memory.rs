//! Reference backend: a recipe catalog held in memory.
//!
//! Serves similarity search (cosine over stored vectors), lexical search (TF-IDF
//! over title, description and main ingredient), recipe reads, and vector writes.
//! Only approved recipes are ever returned by the search paths.

use super::{
    LexicalHit, LexicalQuery, LexicalSearch, RecipeSource, SimilarityHit, SimilarityQuery,
    SimilaritySearch, VectorSink,
};
use crate::error::BackendError;
use crate::search::FilterSet;
use crate::search::index::{IndexBuilder, LexicalIndex};
use crate::search::scoring::rated_score;
use crate::types::{Recipe, RecipeId};
use ahash::AHashMap;
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;

const TITLE_WEIGHT: f32 = 2.0;
const BODY_WEIGHT: f32 = 1.0;

/// Cosine similarity; 0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Squash an unbounded TF-IDF sum into 0-1 as `score / (score + 1)`.
fn bounded_rank(score: f32) -> f32 {
    score / (score + 1.0)
}

pub struct InMemoryCatalog {
    recipes: Vec<Recipe>,
    positions: AHashMap<RecipeId, usize>,
    index: LexicalIndex,
    vectors: RwLock<AHashMap<RecipeId, Vec<f32>>>,
}

impl std::fmt::Debug for InMemoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCatalog")
            .field("recipes", &self.recipes.len())
            .field("indexed_terms", &self.index.term_count())
            .finish_non_exhaustive()
    }
}

impl InMemoryCatalog {
    /// Build the catalog and its lexical index. Later duplicates of an id are dropped.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let start = std::time::Instant::now();
        let mut kept = Vec::new();
        let mut positions = AHashMap::new();

        for recipe in recipes {
            if positions.contains_key(&recipe.id) {
                tracing::warn!(
                    id = %recipe.id,
                    "Duplicate recipe id in catalog, keeping the first"
                );
                continue;
            }
            positions.insert(recipe.id.clone(), kept.len());
            kept.push(recipe);
        }

        let mut builder = IndexBuilder::default();
        for (doc_id, recipe) in kept.iter().enumerate() {
            builder.add_field(doc_id, &recipe.title, TITLE_WEIGHT);
            if let Some(description) = &recipe.description {
                builder.add_field(doc_id, description, BODY_WEIGHT);
            }
            builder.add_field(doc_id, &recipe.main_ingredient, BODY_WEIGHT);
        }
        let index = builder.finalize();

        tracing::info!(
            recipes = kept.len(),
            terms = index.term_count(),
            elapsed = ?start.elapsed(),
            "Built recipe catalog"
        );

        Self {
            recipes: kept,
            positions,
            index,
            vectors: RwLock::new(AHashMap::new()),
        }
    }

    /// Parse a JSON array of recipes.
    pub fn from_json(json: &str) -> Result<Self, BackendError> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;
        Ok(Self::from_recipes(recipes))
    }

    /// Load a JSON array of recipes from disk.
    pub async fn load_json(path: &Path) -> Result<Self, BackendError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Number of recipes with a stored vector.
    pub async fn embedded_count(&self) -> usize {
        self.vectors.read().await.len()
    }

    fn visible<'a>(&'a self, filters: &'a FilterSet) -> impl Iterator<Item = &'a Recipe> + 'a {
        self.recipes
            .iter()
            .filter(move |recipe| recipe.is_approved() && filters.matches(recipe))
    }
}

#[async_trait]
impl SimilaritySearch for InMemoryCatalog {
    /// Ordered by `similarity * 0.7 + rating / 5 * 0.3`; ties keep catalog order.
    async fn search(&self, query: SimilarityQuery) -> Result<Vec<SimilarityHit>, BackendError> {
        let vectors = self.vectors.read().await;

        let mut hits: Vec<(f32, SimilarityHit)> = self
            .visible(&query.filters)
            .filter_map(|recipe| {
                let stored = vectors.get(&recipe.id)?;
                let similarity = cosine_similarity(&query.vector, stored);
                (similarity >= query.min_score).then(|| {
                    (
                        rated_score(similarity, recipe.average_rating),
                        SimilarityHit {
                            recipe: recipe.clone(),
                            similarity,
                        },
                    )
                })
            })
            .collect();

        hits.sort_by(|(a, _), (b, _)| b.total_cmp(a));
        hits.truncate(query.limit);
        Ok(hits.into_iter().map(|(_, hit)| hit).collect())
    }
}

#[async_trait]
impl LexicalSearch for InMemoryCatalog {
    async fn search(&self, query: LexicalQuery) -> Result<Vec<LexicalHit>, BackendError> {
        Ok(self
            .index
            .search(&query.text)
            .into_iter()
            .filter_map(|(doc_id, score)| {
                let recipe = self.recipes.get(doc_id)?;
                (recipe.is_approved() && query.filters.matches(recipe)).then(|| LexicalHit {
                    recipe: recipe.clone(),
                    rank: bounded_rank(score),
                })
            })
            .take(query.limit)
            .collect())
    }
}

#[async_trait]
impl RecipeSource for InMemoryCatalog {
    async fn fetch_one(&self, id: &RecipeId) -> Result<Option<Recipe>, BackendError> {
        Ok(self
            .positions
            .get(id)
            .map(|&position| &self.recipes[position])
            .filter(|recipe| recipe.is_approved())
            .cloned())
    }

    async fn fetch_approved(&self, filters: &FilterSet) -> Result<Vec<Recipe>, BackendError> {
        Ok(self.visible(filters).cloned().collect())
    }

    async fn fetch_unembedded(&self) -> Result<Vec<Recipe>, BackendError> {
        let vectors = self.vectors.read().await;
        let everything = FilterSet::default();
        Ok(self
            .visible(&everything)
            .filter(|recipe| !vectors.contains_key(&recipe.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VectorSink for InMemoryCatalog {
    async fn store_embedding(&self, id: &RecipeId, vector: Vec<f32>) -> Result<(), BackendError> {
        if !self.positions.contains_key(id) {
            return Err(BackendError::NotFound(format!("recipe '{}'", id)));
        }
        self.vectors.write().await.insert(id.clone(), vector);
        Ok(())
    }
}
