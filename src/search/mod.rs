//! Query understanding and ranking.
//!
//! Filter extraction, synonym expansion, score fusion, ingredient scoring and
//! autocomplete ranking. Everything here is pure; collaborator calls live in
//! [`crate::service`].

pub mod expansion;
pub mod filters;
pub mod fusion;
pub(crate) mod index;
pub mod ingredients;
pub mod pantry;
pub mod query;
pub mod scoring;
pub mod suggest;
pub(crate) mod tokenize;

pub use expansion::{QueryExpander, Thesaurus, WordListThesaurus};
pub use filters::FilterSet;
pub use query::{ParsedQuery, extract_filters};
pub use suggest::{MatchType, Suggestion};
