//! Ingredient-list search handler.

use super::{SUCCESS, elapsed_ms, render};
use crate::service::SearchService;
use crate::types::{IngredientSearchRequest, MatchMode, ScoredCandidate};
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Serialize)]
pub struct IngredientSearchResponse<'a> {
    pub status: &'static str,
    pub data: Vec<ScoredCandidate>,
    pub total: usize,
    pub ingredients: &'a [String],
    pub match_mode: MatchMode,
    pub execution_time_ms: f64,
}

/// Rank recipes by the ingredients they use.
pub async fn handle_ingredient_search(
    service: &SearchService,
    request: IngredientSearchRequest,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let start = Instant::now();
    let results = service
        .ingredient_search(&request, cancel)
        .await
        .map_err(|e| format!("Ingredient search failed: {}", e))?;

    render(&IngredientSearchResponse {
        status: SUCCESS,
        total: results.len(),
        data: results,
        ingredients: &request.ingredients,
        match_mode: request.match_mode,
        execution_time_ms: elapsed_ms(start),
    })
}
