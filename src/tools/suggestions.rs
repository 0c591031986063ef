//! Autocomplete handlers for the recipe search box and ingredient inputs.

use super::{SUCCESS, elapsed_ms, render};
use crate::service::SearchService;
use crate::types::{PantryRequest, SuggestionRequest};
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Serialize)]
pub struct SuggestionResponse<'a, T> {
    pub status: &'static str,
    pub suggestions: Vec<T>,
    pub total: usize,
    pub query: &'a str,
    pub execution_time_ms: f64,
}

impl<'a, T> SuggestionResponse<'a, T> {
    fn new(query: &'a str, suggestions: Vec<T>, start: Instant) -> Self {
        Self {
            status: SUCCESS,
            total: suggestions.len(),
            suggestions,
            query,
            execution_time_ms: elapsed_ms(start),
        }
    }
}

/// Recipe suggestions while the user types.
///
/// Best-effort: the search box is still usable without suggestions, so a backend
/// failure renders an empty list instead of an error.
pub async fn handle_search_suggestions(
    service: &SearchService,
    request: SuggestionRequest,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let start = Instant::now();
    let suggestions = service
        .suggestions_or_empty(&request, cancel)
        .await
        .map_err(|e| format!("Suggestion search failed: {}", e))?;

    render(&SuggestionResponse::new(&request.query, suggestions, start))
}

/// Ingredient-name suggestions from the built-in pantry list.
pub fn handle_ingredient_suggestions(
    service: &SearchService,
    request: PantryRequest,
) -> Result<String, String> {
    let start = Instant::now();
    let suggestions = service
        .ingredient_suggestions(&request)
        .map_err(|e| format!("Ingredient suggestion failed: {}", e))?;

    render(&SuggestionResponse::new(&request.query, suggestions, start))
}
