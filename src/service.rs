//! Top-level search operations.
//!
//! [`SearchService`] sequences filter extraction, query expansion, collaborator
//! calls and fusion for each exposed operation. It holds no per-request state;
//! every call validates its request, runs against the collaborators and is raced
//! against the caller's [`CancellationToken`].

use crate::backend::{
    Embedder, InMemoryCatalog, LexicalQuery, LexicalSearch, RecipeSource, SimilarityHit,
    SimilarityQuery, SimilaritySearch,
};
use crate::error::SearchError;
use crate::search::expansion::QueryExpander;
use crate::search::fusion::{fuse_hybrid, fuse_variants, pass_through};
use crate::search::ingredients::{normalize_ingredients, rank_by_ingredients};
use crate::search::pantry::{IngredientSuggestion, suggest_ingredients};
use crate::search::query::extract_filters;
use crate::search::suggest::{Suggestion, rank_suggestions};
use crate::search::FilterSet;
use crate::types::{
    IngredientSearchRequest, PantryRequest, ScoredCandidate, SearchRequest, SuggestionRequest,
};
use futures::future::try_join_all;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Similarity floor applied to plain and hybrid search when none is configured.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.4;

/// Fused searches ask each leg for this many times the requested limit.
const FETCH_MULTIPLIER: usize = 2;

/// Run `request` unless `cancel` fires first.
///
/// A cancelled request yields [`SearchError::Cancelled`] and the request future is
/// dropped, which drops any collaborator calls still in flight.
pub(crate) async fn until_cancelled<T, F>(
    cancel: &CancellationToken,
    request: F,
) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, SearchError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SearchError::Cancelled),
        result = request => result,
    }
}

/// The collaborator handles a [`SearchService`] is built from.
#[derive(Clone)]
pub struct Collaborators {
    pub embedder: Arc<dyn Embedder>,
    pub similarity: Arc<dyn SimilaritySearch>,
    pub lexical: Arc<dyn LexicalSearch>,
    pub recipes: Arc<dyn RecipeSource>,
}

impl Collaborators {
    /// Every search role served by one in-memory catalog.
    pub fn from_catalog(catalog: Arc<InMemoryCatalog>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            similarity: catalog.clone(),
            lexical: catalog.clone(),
            recipes: catalog,
        }
    }
}

/// Result of a smart search: the ranking plus what was understood from the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartSearchOutcome {
    pub results: Vec<ScoredCandidate>,
    /// The query with time and difficulty phrases removed.
    pub parsed_query: String,
    /// Filters inferred from the text alone, before caller filters were merged in.
    pub extracted_filters: FilterSet,
}

#[derive(Clone)]
pub struct SearchService {
    collaborators: Collaborators,
    expander: QueryExpander,
    similarity_threshold: f32,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("expander", &self.expander)
            .field("similarity_threshold", &self.similarity_threshold)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            expander: QueryExpander::curated(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_expander(mut self, expander: QueryExpander) -> Self {
        self.expander = expander;
        self
    }

    #[must_use]
    pub const fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub const fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.collaborators.embedder
    }

    /// Embed `text` and run one similarity query with the configured floor.
    async fn similar(
        &self,
        text: &str,
        filters: &FilterSet,
        limit: usize,
    ) -> Result<Vec<SimilarityHit>, SearchError> {
        let vector = self
            .collaborators
            .embedder
            .embed(text)
            .await
            .map_err(SearchError::unavailable("embedder"))?;

        self.collaborators
            .similarity
            .search(SimilarityQuery {
                vector,
                filters: filters.clone(),
                min_score: self.similarity_threshold,
                limit,
            })
            .await
            .map_err(SearchError::unavailable("similarity search"))
    }

    /// Plain semantic search: one similarity query, backend order kept.
    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScoredCandidate>, SearchError> {
        request.validate()?;
        let start = Instant::now();
        let filters = request.filters.clone().unwrap_or_default();

        let hits = until_cancelled(cancel, self.similar(&request.query, &filters, request.limit))
            .await?;
        let results = pass_through(hits, request.limit);

        tracing::info!(
            query = %request.query,
            results = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(results)
    }

    /// Natural-language search.
    ///
    /// Filters are inferred from the text and merged under the caller's, the cleaned
    /// text is expanded into weighted variants, and every variant is searched
    /// concurrently for twice the limit before the results are fused.
    pub async fn smart_search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SmartSearchOutcome, SearchError> {
        request.validate()?;
        let start = Instant::now();

        let parsed = extract_filters(&request.query);
        let manual = request.filters.clone().unwrap_or_default();
        let filters = FilterSet::merged(&parsed.filters, &manual);
        let variants = self.expander.expand(&parsed.cleaned);
        let fetch_limit = request.limit * FETCH_MULTIPLIER;

        tracing::debug!(
            cleaned = %parsed.cleaned,
            ?variants,
            ?filters,
            "Smart search plan"
        );

        let per_variant = until_cancelled(
            cancel,
            try_join_all(
                variants
                    .iter()
                    .map(|variant| self.similar(variant, &filters, fetch_limit)),
            ),
        )
        .await?;
        let results = fuse_variants(&per_variant, request.limit);

        tracing::info!(
            query = %request.query,
            variants = variants.len(),
            results = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Smart search complete"
        );
        Ok(SmartSearchOutcome {
            results,
            parsed_query: parsed.cleaned,
            extracted_filters: parsed.filters,
        })
    }

    /// Semantic and keyword search run side by side, then fused 0.6 / 0.4.
    pub async fn hybrid_search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScoredCandidate>, SearchError> {
        request.validate()?;
        let start = Instant::now();
        let filters = request.filters.clone().unwrap_or_default();
        let fetch_limit = request.limit * FETCH_MULTIPLIER;

        let lexical = async {
            self.collaborators
                .lexical
                .search(LexicalQuery {
                    text: request.query.clone(),
                    filters: filters.clone(),
                    limit: fetch_limit,
                })
                .await
                .map_err(SearchError::unavailable("lexical search"))
        };

        let (semantic_hits, lexical_hits) = until_cancelled(cancel, async {
            tokio::try_join!(self.similar(&request.query, &filters, fetch_limit), lexical)
        })
        .await?;
        let results = fuse_hybrid(&semantic_hits, &lexical_hits, request.limit);

        tracing::info!(
            query = %request.query,
            semantic = semantic_hits.len(),
            lexical = lexical_hits.len(),
            results = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Hybrid search complete"
        );
        Ok(results)
    }

    /// Rank approved recipes by how well they use the given ingredients.
    ///
    /// Ingredient names that are blank after trimming are dropped; if none remain
    /// the result is empty.
    pub async fn ingredient_search(
        &self,
        request: &IngredientSearchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScoredCandidate>, SearchError> {
        request.validate()?;
        let targets = normalize_ingredients(&request.ingredients);
        if targets.is_empty() {
            tracing::debug!("No usable ingredient names, returning empty result");
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let filters = request.filters.clone().unwrap_or_default();

        let recipes = until_cancelled(cancel, async {
            self.collaborators
                .recipes
                .fetch_approved(&filters)
                .await
                .map_err(SearchError::unavailable("recipe source"))
        })
        .await?;
        let candidates = recipes.len();
        let results = rank_by_ingredients(recipes, &targets, request.match_mode, request.limit);

        tracing::info!(
            ingredients = ?targets,
            match_mode = %request.match_mode,
            candidates,
            results = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Ingredient search complete"
        );
        Ok(results)
    }

    /// Autocomplete suggestions for a typed prefix.
    pub async fn suggestions(
        &self,
        request: &SuggestionRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Suggestion>, SearchError> {
        request.validate()?;

        let candidates = until_cancelled(cancel, async {
            self.collaborators
                .recipes
                .fetch_approved(&FilterSet::default())
                .await
                .map_err(SearchError::unavailable("recipe source"))
        })
        .await?;

        let suggestions = rank_suggestions(candidates, &request.query, request.limit);
        tracing::debug!(
            prefix = %request.query,
            suggestions = suggestions.len(),
            "Ranked suggestions"
        );
        Ok(suggestions)
    }

    /// [`suggestions`](Self::suggestions) for best-effort callers such as a search box.
    ///
    /// A collaborator failure is logged and yields an empty list. Invalid input and
    /// cancellation are still reported.
    pub async fn suggestions_or_empty(
        &self,
        request: &SuggestionRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Suggestion>, SearchError> {
        match self.suggestions(request, cancel).await {
            Err(e @ SearchError::CollaboratorUnavailable { .. }) => {
                tracing::warn!(
                    prefix = %request.query,
                    error = %e,
                    "Suggestions unavailable, returning none"
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Ingredient-name autocomplete from the built-in pantry list. No collaborator calls.
    pub fn ingredient_suggestions(
        &self,
        request: &PantryRequest,
    ) -> Result<Vec<IngredientSuggestion>, SearchError> {
        request.validate()?;
        Ok(suggest_ingredients(&request.query, request.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::let_assert;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_finished_request_passes_through() {
        let cancel = CancellationToken::new();
        let_assert!(Ok(7) = until_cancelled(&cancel, async { Ok::<_, SearchError>(7) }).await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancelled_token_wins_over_ready_request() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let_assert!(
            Err(SearchError::Cancelled) =
                until_cancelled(&cancel, async { Ok::<_, SearchError>(7) }).await
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancellation_interrupts_pending_request() {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();
        let stalled = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, SearchError>(())
        };

        let handle = tokio::spawn(async move { until_cancelled(&child, stalled).await });
        cancel.cancel();
        let_assert!(Ok(Err(SearchError::Cancelled)) = handle.await);
    }
}
