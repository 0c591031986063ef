//! Query understanding and multi-signal ranking for recipe search.
//!
//! [`SearchService`] is the entry point: plain, smart, hybrid and ingredient search
//! plus autocomplete, each sequencing filter extraction, query expansion,
//! collaborator calls and score fusion. Collaborators (embedder, similarity and
//! lexical search, recipe source) are traits in [`backend`]; the crate ships a
//! hashing embedder and an in-memory catalog that implement them.

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod search;
pub mod server;
pub mod service;
pub mod tools;
pub mod tracing;
pub mod types;

pub use app::AppContext;
pub use config::Settings;
pub use embedding::{BackfillReport, EmbeddingPipeline, prepare_recipe_text};
pub use error::{BackendError, SearchError};
pub use search::FilterSet;
pub use server::RecipeServer;
pub use service::{Collaborators, SearchService, SmartSearchOutcome};
pub use types::{
    IngredientSearchRequest, MatchMode, PantryRequest, Recipe, RecipeId, ScoredCandidate,
    SearchRequest, SuggestionRequest,
};
