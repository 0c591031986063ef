//! Embedding generation: turning approved recipes into stored vectors.

use crate::backend::{Embedder, RecipeSource, VectorSink};
use crate::error::{BackendError, SearchError};
use crate::service::until_cancelled;
use crate::types::{Recipe, RecipeId};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Recipes embedded per batch call when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Text representation of a recipe for embedding.
///
/// Parts are joined with `". "`: title, description, main ingredient, ingredient
/// names, cuisine, meal types, dietary labels, and allergens the recipe is free of.
/// Labelled parts with nothing to say are left out.
pub fn prepare_recipe_text(recipe: &Recipe) -> String {
    let labelled = |label: &str, value: String| {
        (!value.trim().is_empty()).then(|| format!("{}: {}", label, value))
    };

    let ingredients = recipe
        .ingredients
        .iter()
        .map(|line| line.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let meal_types = recipe
        .meal_type
        .iter()
        .map(|meal| meal.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let parts = [
        Some(recipe.title.clone()).filter(|title| !title.trim().is_empty()),
        recipe.description.clone().filter(|text| !text.trim().is_empty()),
        labelled("Main ingredient", recipe.main_ingredient.clone()),
        labelled("Ingredients", ingredients),
        labelled("Cuisine", recipe.cuisine_type.clone().unwrap_or_default()),
        labelled("Meal type", meal_types),
        labelled("Dietary", recipe.dietary_info.labels().join(", ")),
        labelled("Allergen-free", recipe.allergies.join(", ")),
    ];

    parts.into_iter().flatten().collect::<Vec<_>>().join(". ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedEmbedding {
    pub recipe_id: RecipeId,
    pub dimension: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Approved recipes that had no vector when the run started.
    pub total: usize,
    /// Vectors stored by this run.
    pub embedded: usize,
}

/// Reads recipes, embeds them and hands the vectors to a sink.
#[derive(Clone)]
pub struct EmbeddingPipeline {
    source: Arc<dyn RecipeSource>,
    embedder: Arc<dyn Embedder>,
    sink: Arc<dyn VectorSink>,
    batch_size: usize,
}

impl std::fmt::Debug for EmbeddingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingPipeline")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl EmbeddingPipeline {
    pub fn new(
        source: Arc<dyn RecipeSource>,
        embedder: Arc<dyn Embedder>,
        sink: Arc<dyn VectorSink>,
    ) -> Self {
        Self {
            source,
            embedder,
            sink,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// A zero batch size is bumped to 1.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed and store one approved recipe.
    pub async fn generate_one(
        &self,
        id: &RecipeId,
        cancel: &CancellationToken,
    ) -> Result<GeneratedEmbedding, SearchError> {
        until_cancelled(cancel, async {
            let recipe = self
                .source
                .fetch_one(id)
                .await
                .map_err(SearchError::unavailable("recipe source"))?
                .ok_or_else(|| SearchError::RecipeNotFound(id.clone()))?;

            let vector = self
                .embedder
                .embed(&prepare_recipe_text(&recipe))
                .await
                .map_err(SearchError::unavailable("embedder"))?;
            let dimension = vector.len();

            self.sink
                .store_embedding(id, vector)
                .await
                .map_err(SearchError::unavailable("vector store"))?;

            tracing::info!(id = %id, dimension, "Generated embedding");
            Ok(GeneratedEmbedding {
                recipe_id: id.clone(),
                dimension,
            })
        })
        .await
    }

    /// Embed every approved recipe that has no vector yet, in batches.
    ///
    /// Vectors are stored as each batch completes, so a cancelled or failed run
    /// keeps its progress and a rerun picks up the rest.
    pub async fn backfill(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BackfillReport, SearchError> {
        let pending = until_cancelled(cancel, async {
            self.source
                .fetch_unembedded()
                .await
                .map_err(SearchError::unavailable("recipe source"))
        })
        .await?;

        let mut report = BackfillReport {
            total: pending.len(),
            embedded: 0,
        };
        if pending.is_empty() {
            tracing::info!("No recipes need embeddings");
            return Ok(report);
        }
        tracing::info!(
            total = report.total,
            batch_size = self.batch_size,
            "Backfilling embeddings"
        );

        for batch in pending.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(prepare_recipe_text).collect();
            let vectors = until_cancelled(cancel, async {
                self.embedder
                    .embed_batch(&texts)
                    .await
                    .map_err(SearchError::unavailable("embedder"))
            })
            .await?;
            if vectors.len() != batch.len() {
                let message = format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                );
                return Err(SearchError::unavailable("embedder")(
                    BackendError::Unavailable(message),
                ));
            }

            for (recipe, vector) in batch.iter().zip(vectors) {
                self.sink
                    .store_embedding(&recipe.id, vector)
                    .await
                    .map_err(SearchError::unavailable("vector store"))?;
                report.embedded += 1;
            }

            tracing::debug!(
                embedded = report.embedded,
                total = report.total,
                "Embedded batch"
            );
        }

        tracing::info!(embedded = report.embedded, "Backfill complete");
        Ok(report)
    }
}
