//! Free-text search handlers: plain, smart and hybrid.

use super::{SUCCESS, elapsed_ms, render};
use crate::search::FilterSet;
use crate::service::SearchService;
use crate::types::{ScoredCandidate, SearchRequest};
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Serialize)]
pub struct SearchResponse<'a> {
    pub status: &'static str,
    pub data: Vec<ScoredCandidate>,
    pub total: usize,
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_filters: Option<FilterSet>,
    pub execution_time_ms: f64,
}

impl<'a> SearchResponse<'a> {
    fn new(query: &'a str, data: Vec<ScoredCandidate>, start: Instant) -> Self {
        Self {
            status: SUCCESS,
            total: data.len(),
            data,
            query,
            parsed_query: None,
            extracted_filters: None,
            execution_time_ms: elapsed_ms(start),
        }
    }
}

/// Semantic search over recipe embeddings.
pub async fn handle_search_recipes(
    service: &SearchService,
    request: SearchRequest,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let start = Instant::now();
    let results = service
        .search(&request, cancel)
        .await
        .map_err(|e| format!("Search failed: {}", e))?;

    render(&SearchResponse::new(&request.query, results, start))
}

/// Natural-language search; echoes what was understood from the query.
pub async fn handle_smart_search(
    service: &SearchService,
    request: SearchRequest,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let start = Instant::now();
    let outcome = service
        .smart_search(&request, cancel)
        .await
        .map_err(|e| format!("Smart search failed: {}", e))?;

    let mut response = SearchResponse::new(&request.query, outcome.results, start);
    response.parsed_query = Some(outcome.parsed_query);
    response.extracted_filters = Some(outcome.extracted_filters);
    render(&response)
}

/// Semantic plus keyword search.
pub async fn handle_hybrid_search(
    service: &SearchService,
    request: SearchRequest,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let start = Instant::now();
    let results = service
        .hybrid_search(&request, cancel)
        .await
        .map_err(|e| format!("Hybrid search failed: {}", e))?;

    render(&SearchResponse::new(&request.query, results, start))
}
