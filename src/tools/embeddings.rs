//! Embedding generation and health handlers.

use super::{SUCCESS, render};
use crate::backend::InMemoryCatalog;
use crate::embedding::EmbeddingPipeline;
use crate::types::RecipeId;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateEmbeddingRequest {
    /// Id of an approved recipe
    pub recipe_id: String,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub status: &'static str,
    pub recipe_id: RecipeId,
    pub embedding_generated: bool,
    pub dimension: usize,
    pub message: String,
}

/// Embed one approved recipe and store the vector.
pub async fn handle_generate_embedding(
    pipeline: &EmbeddingPipeline,
    request: GenerateEmbeddingRequest,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let id = RecipeId::new(request.recipe_id);
    let generated = pipeline
        .generate_one(&id, cancel)
        .await
        .map_err(|e| format!("Embedding generation failed: {}", e))?;

    render(&EmbeddingResponse {
        status: SUCCESS,
        message: format!("Embedding generated successfully for recipe {}", generated.recipe_id),
        recipe_id: generated.recipe_id,
        embedding_generated: true,
        dimension: generated.dimension,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the catalog is empty
    pub status: &'static str,
    pub recipes: usize,
    pub embedded_recipes: usize,
    pub embedding_dimension: usize,
    pub similarity_threshold: f32,
}

pub async fn handle_health(
    catalog: &InMemoryCatalog,
    embedding_dimension: usize,
    similarity_threshold: f32,
) -> Result<String, String> {
    render(&HealthResponse {
        status: if catalog.is_empty() { "degraded" } else { "healthy" },
        recipes: catalog.len(),
        embedded_recipes: catalog.embedded_count().await,
        embedding_dimension,
        similarity_threshold,
    })
}
