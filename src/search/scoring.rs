//! Score blending and text-match tiers shared by the ranking paths.

/// Ratings are on a 0-5 scale.
pub const RATING_SCALE: f32 = 5.0;

/// Weight of the primary signal in [`rated_score`]; the rating gets the rest.
const PRIMARY_WEIGHT: f32 = 0.7;
const RATING_WEIGHT: f32 = 0.3;

/// Rating mapped onto 0-1. A recipe nobody rated counts as 0.
pub fn normalized_rating(rating: Option<f32>) -> f32 {
    rating.map_or(0.0, |value| value / RATING_SCALE)
}

/// Blend a primary relevance signal with the recipe's rating:
/// `primary * 0.7 + rating / 5 * 0.3`.
///
/// Orders vector-only search (primary = similarity) and ingredient search
/// (primary = match score).
pub fn rated_score(primary: f32, rating: Option<f32>) -> f32 {
    primary * PRIMARY_WEIGHT + normalized_rating(rating) * RATING_WEIGHT
}

/// How a piece of text matched a query, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextMatch {
    Exact,
    Prefix,
    Contains,
}

/// Classify how `text` matches `query`.
///
/// Both sides are compared as given; callers lowercase them first for
/// case-insensitive matching.
pub fn text_match(text: &str, query: &str) -> Option<TextMatch> {
    if query.is_empty() {
        None
    } else if text == query {
        Some(TextMatch::Exact)
    } else if text.starts_with(query) {
        Some(TextMatch::Prefix)
    } else if text.contains(query) {
        Some(TextMatch::Contains)
    } else {
        None
    }
}
