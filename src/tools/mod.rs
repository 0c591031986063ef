//! Tool handlers: run one service operation and render its JSON response envelope.

pub mod embeddings;
pub mod ingredients;
pub mod search;
pub mod suggestions;

pub use embeddings::*;
pub use ingredients::*;
pub use search::*;
pub use suggestions::*;

use serde::Serialize;
use std::time::Instant;

pub(crate) const SUCCESS: &str = "success";

/// Milliseconds since `start`, rounded to two decimals.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 100_000.0).round() / 100.0
}

pub(crate) fn render<T: Serialize>(response: &T) -> Result<String, String> {
    serde_json::to_string_pretty(response).map_err(|e| format!("Failed to encode response: {}", e))
}
