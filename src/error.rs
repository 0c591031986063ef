//! Error handling types and utilities.

use crate::types::RecipeId;

/// A specialized Result type for the outer layers (CLI, server glue).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods.
pub type Result<T> = anyhow::Result<T>;

/// Errors surfaced by the search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request was malformed. Never retried.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// An embedding or search backend failed; the whole request fails.
    #[error("{collaborator} unavailable: {source}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        #[source]
        source: BackendError,
    },

    /// The recipe does not exist or is not approved.
    #[error("recipe '{0}' not found or not approved")]
    RecipeNotFound(RecipeId),

    /// The caller abandoned the request before it finished.
    #[error("request cancelled")]
    Cancelled,
}

impl SearchError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(collaborator: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| Self::CollaboratorUnavailable {
            collaborator,
            source,
        }
    }
}

/// Errors returned by collaborator adapters (embedders, search backends, recipe sources).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data: {0}")]
    Parse(#[from] serde_json::Error),
}
