//! Autocomplete ranking for the search box.
//!
//! Each candidate gets a tiered base score from the first field group that matches
//! the typed prefix, then small boosts for rating and popularity.

use crate::search::scoring::{TextMatch, text_match};
use crate::types::{MealType, Recipe, RecipeId};
use serde::Serialize;
use std::cmp::Ordering;

/// Rating boost per star; a 5-star recipe gains 100.
const RATING_BOOST: f32 = 20.0;
/// Popularity boost is one point per rating, up to this many.
const POPULARITY_CAP: u32 = 50;

/// Which field group produced the suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Title,
    Ingredient,
    Cuisine,
    Description,
}

/// One autocomplete entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: RecipeId,
    pub title: String,
    pub main_ingredient: String,
    pub cuisine_type: Option<String>,
    pub meal_type: Vec<MealType>,
    pub image_urls: Vec<String>,
    pub average_rating: Option<f32>,
    pub total_ratings: u32,
    #[serde(rename = "match_type")]
    pub match_type: MatchType,
    #[serde(rename = "relevance_score")]
    pub relevance_score: f32,
}

/// Base tier for `recipe` against a lowercase, trimmed `prefix`.
///
/// | field | exact | starts with | contains |
/// |---|---|---|---|
/// | title | 1000 | 900 | 800 |
/// | main ingredient | 700 | 600 | 500 |
/// | cuisine | | | 400 |
/// | description | | | 300 |
pub fn base_tier(recipe: &Recipe, prefix: &str) -> Option<(u32, MatchType)> {
    if let Some(found) = text_match(&recipe.title.to_lowercase(), prefix) {
        let tier = match found {
            TextMatch::Exact => 1000,
            TextMatch::Prefix => 900,
            TextMatch::Contains => 800,
        };
        return Some((tier, MatchType::Title));
    }

    if let Some(found) = text_match(&recipe.main_ingredient.to_lowercase(), prefix) {
        let tier = match found {
            TextMatch::Exact => 700,
            TextMatch::Prefix => 600,
            TextMatch::Contains => 500,
        };
        return Some((tier, MatchType::Ingredient));
    }

    let contains = |field: Option<&str>| {
        field.is_some_and(|text| !prefix.is_empty() && text.to_lowercase().contains(prefix))
    };
    if contains(recipe.cuisine_type.as_deref()) {
        return Some((400, MatchType::Cuisine));
    }
    if contains(recipe.description.as_deref()) {
        return Some((300, MatchType::Description));
    }

    None
}

/// Base tier plus `rating * 20` plus `min(total_ratings, 50)`.
fn relevance(base: u32, recipe: &Recipe) -> f32 {
    base as f32
        + recipe.average_rating.unwrap_or(0.0) * RATING_BOOST
        + recipe.total_ratings.min(POPULARITY_CAP) as f32
}

/// Higher rating first, unrated last.
fn by_rating_desc(a: Option<f32>, b: Option<f32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank autocomplete candidates for a typed prefix.
///
/// Candidates matching no field are dropped. Ties on the final score go to the
/// higher raw rating.
pub fn rank_suggestions(candidates: Vec<Recipe>, prefix: &str, limit: usize) -> Vec<Suggestion> {
    let prefix = prefix.trim().to_lowercase();

    let mut ranked: Vec<Suggestion> = candidates
        .into_iter()
        .filter_map(|recipe| {
            let (base, match_type) = base_tier(&recipe, &prefix)?;
            let relevance_score = relevance(base, &recipe);
            Some(Suggestion {
                id: recipe.id,
                title: recipe.title,
                main_ingredient: recipe.main_ingredient,
                cuisine_type: recipe.cuisine_type,
                meal_type: recipe.meal_type,
                image_urls: recipe.image_urls,
                average_rating: recipe.average_rating,
                total_ratings: recipe.total_ratings,
                match_type,
                relevance_score,
            })
        })
        .filter(|suggestion| suggestion.relevance_score > 0.0)
        .collect();

    ranked.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| by_rating_desc(a.average_rating, b.average_rating))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    fn recipe(id: &str, title: &str, main: &str) -> Recipe {
        Recipe::new(id, title, main)
    }

    #[rstest]
    #[case("Thai Chicken Curry", "thai", 900)]
    #[case("Green Thai Curry", "thai", 800)]
    #[case("Thai Chicken Curry", "thai chicken curry", 1000)]
    #[case("THAI CHICKEN CURRY", "thai chicken curry", 1000)]
    fn test_title_tiers(#[case] title: &str, #[case] prefix: &str, #[case] tier: u32) {
        let_assert!(Some((base, kind)) = base_tier(&recipe("r", title, "chicken"), prefix));
        check!(base == tier);
        check!(kind == MatchType::Title);
    }

    #[rstest]
    #[case("chicken", 700)]
    #[case("chick", 600)]
    #[case("icken", 500)]
    fn test_ingredient_tiers(#[case] prefix: &str, #[case] tier: u32) {
        let curry = recipe("r", "Weeknight Curry", "Chicken");
        let_assert!(Some((base, kind)) = base_tier(&curry, prefix));
        check!(base == tier);
        check!(kind == MatchType::Ingredient);
    }

    #[test]
    fn test_cuisine_and_description_tiers() {
        let mut curry = recipe("r", "Green Curry", "Tofu");
        curry.cuisine_type = Some("Thai".to_string());
        curry.description = Some("Fragrant coconut sauce".to_string());

        check!(base_tier(&curry, "tha") == Some((400, MatchType::Cuisine)));
        check!(base_tier(&curry, "coconut") == Some((300, MatchType::Description)));
        check!(base_tier(&curry, "beef").is_none());
    }

    #[test]
    fn test_boosts_are_added_and_capped() {
        let mut popular = recipe("p", "Pad Thai", "noodles");
        popular.average_rating = Some(4.5);
        popular.total_ratings = 156;

        let ranked = rank_suggestions(vec![popular], "pad", 10);
        // 900 + 4.5 * 20 + 50
        check!((ranked[0].relevance_score - 1040.0).abs() < 1e-3);
    }

    #[test]
    fn test_ordering_and_rating_tie_break() {
        let mut title_hit = recipe("title", "Thai Basil Beef", "beef");
        title_hit.average_rating = Some(3.0);
        let mut unrated_twin = recipe("unrated", "Thai Fish Cakes", "fish");
        unrated_twin.total_ratings = 50;
        let mut rated_twin = recipe("rated", "Thai Pork Larb", "pork");
        rated_twin.average_rating = Some(2.5);
        let mut cuisine_hit = recipe("cuisine", "Som Tam", "papaya");
        cuisine_hit.cuisine_type = Some("Thai".to_string());
        let miss = recipe("miss", "Lasagne", "pasta");

        let ranked = rank_suggestions(
            vec![miss, cuisine_hit, unrated_twin, rated_twin, title_hit],
            "thai",
            10,
        );
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();

        // 960, then two 950s split by raw rating, then the cuisine match at 400
        check!(ids == vec!["title", "rated", "unrated", "cuisine"]);
        check!(ranked[3].match_type == MatchType::Cuisine);
    }

    #[test]
    fn test_prefix_trimmed_and_case_folded() {
        let carbonara = recipe("r", "Spaghetti Carbonara", "pasta");
        let ranked = rank_suggestions(vec![carbonara], "  SPA ", 10);
        check!(ranked.len() == 1);
        check!(ranked[0].match_type == MatchType::Title);
    }

    #[test]
    fn test_limit() {
        let candidates = (0..5)
            .map(|i| recipe(&format!("r{i}"), "Chicken Soup", "chicken"))
            .collect();
        check!(rank_suggestions(candidates, "chicken", 3).len() == 3);
    }
}
