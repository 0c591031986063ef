//! Ingredient-list matching: weighted multi-field scoring of recipes against a
//! set of target ingredients.

use crate::search::scoring::rated_score;
use crate::types::{MatchMode, Recipe, ScoredCandidate, Signals};

const MAIN_EXACT: u32 = 10;
const MAIN_CONTAINS: u32 = 5;
const PER_INGREDIENT_LINE: u32 = 3;
const TITLE_CONTAINS: u32 = 2;
const DESCRIPTION_CONTAINS: u32 = 1;

/// Trim and lowercase, dropping entries that end up empty. Duplicates are kept.
pub fn normalize_ingredients<S: AsRef<str>>(ingredients: &[S]) -> Vec<String> {
    ingredients
        .iter()
        .map(|ingredient| ingredient.as_ref().trim().to_lowercase())
        .filter(|ingredient| !ingredient.is_empty())
        .collect()
}

/// Per-recipe outcome of ingredient scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngredientMatch {
    pub match_score: u32,
    pub matched_count: u32,
    /// Every target hit the main ingredient exactly or appeared in some line.
    pub covers_all: bool,
}

/// Score one recipe against normalized (lowercase) targets.
///
/// | term | points |
/// |---|---|
/// | main ingredient equals a target | 10, once |
/// | main ingredient contains a target | 5, once |
/// | each ingredient line containing a target | 3 per line |
/// | title contains a target | 2, once |
/// | description contains a target | 1, once |
///
/// `matched_count` is 1 for an exact main-ingredient hit plus the number of distinct
/// targets found in any ingredient line.
pub fn score_recipe(recipe: &Recipe, targets: &[String]) -> IngredientMatch {
    let contains_any = |text: &str| {
        let text = text.to_lowercase();
        targets.iter().any(|target| text.contains(target.as_str()))
    };

    let main = recipe.main_ingredient.to_lowercase();
    let main_exact = targets.iter().any(|target| *target == main);

    let mut match_score = 0;
    if main_exact {
        match_score += MAIN_EXACT;
    }
    if contains_any(&main) {
        match_score += MAIN_CONTAINS;
    }

    let lines: Vec<String> = recipe
        .ingredients
        .iter()
        .map(|line| line.name.to_lowercase())
        .collect();
    let matching_lines = lines
        .iter()
        .filter(|line| targets.iter().any(|target| line.contains(target.as_str())))
        .count() as u32;
    match_score += matching_lines * PER_INGREDIENT_LINE;

    if contains_any(&recipe.title) {
        match_score += TITLE_CONTAINS;
    }
    if recipe.description.as_deref().is_some_and(contains_any) {
        match_score += DESCRIPTION_CONTAINS;
    }

    let mut distinct: Vec<&String> = targets
        .iter()
        .filter(|target| lines.iter().any(|line| line.contains(target.as_str())))
        .collect();
    distinct.sort();
    distinct.dedup();

    let covers_all = targets
        .iter()
        .all(|target| *target == main || lines.iter().any(|line| line.contains(target.as_str())));

    IngredientMatch {
        match_score,
        matched_count: u32::from(main_exact) + distinct.len() as u32,
        covers_all,
    }
}

/// Whether a scored recipe survives the match mode.
///
/// `any` needs a positive score; `all` also needs `matched_count` to reach the
/// number of targets, with each target actually found. The exact main-ingredient
/// point can otherwise stand in for a missing target.
pub fn passes(found: IngredientMatch, mode: MatchMode, target_count: usize) -> bool {
    if found.match_score == 0 {
        return false;
    }
    match mode {
        MatchMode::Any => true,
        MatchMode::All => found.covers_all && found.matched_count as usize >= target_count,
    }
}

/// Score, filter and rank recipes for an ingredient query.
///
/// Ordered by `match_score * 0.7 + rating / 5 * 0.3` descending, then by
/// `matched_count` descending; remaining ties keep input order.
pub fn rank_by_ingredients(
    recipes: Vec<Recipe>,
    targets: &[String],
    mode: MatchMode,
    limit: usize,
) -> Vec<ScoredCandidate> {
    if targets.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<ScoredCandidate> = recipes
        .into_iter()
        .filter_map(|recipe| {
            let found = score_recipe(&recipe, targets);
            passes(found, mode, targets.len()).then(|| ScoredCandidate {
                score: rated_score(found.match_score as f32, recipe.average_rating),
                signals: Signals {
                    match_score: Some(found.match_score),
                    matched_count: Some(found.matched_count),
                    ..Signals::default()
                },
                recipe,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.signals.matched_count.cmp(&a.signals.matched_count))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IngredientLine;
    use assert2::check;
    use rstest::rstest;

    fn recipe(id: &str, main: &str, lines: &[&str]) -> Recipe {
        let mut recipe = Recipe::new(id, id, main);
        recipe.ingredients = lines.iter().copied().map(IngredientLine::named).collect();
        recipe
    }

    fn targets(items: &[&str]) -> Vec<String> {
        normalize_ingredients(items)
    }

    #[test]
    fn test_normalize_trims_lowercases_and_drops_empty() {
        let normalized = normalize_ingredients(&[" Chicken ", "", "   ", "GARLIC", "garlic"]);
        check!(normalized == vec!["chicken", "garlic", "garlic"]);
    }

    #[test]
    fn test_exact_main_ingredient_scores_at_least_ten() {
        let found = score_recipe(&recipe("r", "Chicken", &[]), &targets(&["chicken", "garlic"]));
        // exact (10) + contains (5)
        check!(found.match_score == 15);
        check!(found.matched_count == 1);
    }

    #[test]
    fn test_every_field_contributes() {
        let mut full = recipe(
            "r",
            "chicken thighs",
            &["Chicken stock", "garlic cloves", "ginger", "crushed garlic"],
        );
        full.title = "Garlic Chicken".to_string();
        full.description = Some("Sticky and garlicky".to_string());

        let found = score_recipe(&full, &targets(&["chicken", "garlic"]));

        // contains 5 + three lines 9 + title 2 + description 1
        check!(found.match_score == 17);
        // no exact main hit; both targets appear in lines
        check!(found.matched_count == 2);
    }

    #[rstest]
    #[case(MatchMode::Any, true)]
    #[case(MatchMode::All, false)]
    fn test_all_mode_excludes_partial_matches(#[case] mode: MatchMode, #[case] kept: bool) {
        let omelette = recipe("omelette", "bread", &["eggs", "egg yolk", "salt"]);
        // Exact main hit plus the same target in a line still counts twice
        let egg_only = recipe("egg", "egg", &["eggs", "egg yolk", "salt"]);
        check!(score_recipe(&egg_only, &targets(&["egg", "rice"])).matched_count == 2);

        let ranked =
            rank_by_ingredients(vec![omelette, egg_only], &targets(&["egg", "rice"]), mode, 10);
        check!(ranked.is_empty() != kept);
    }

    #[test]
    fn test_all_mode_keeps_full_matches() {
        let fried_rice = recipe("fried-rice", "rice", &["cooked rice", "egg", "spring onion"]);
        let ranked =
            rank_by_ingredients(vec![fried_rice], &targets(&["egg", "rice"]), MatchMode::All, 10);

        check!(ranked.len() == 1);
        // exact main (1) + egg and rice in lines (2)
        check!(ranked[0].signals.matched_count == Some(3));
    }

    #[test]
    fn test_ranking_blends_rating_then_matched_count() {
        let mut rated = recipe("rated", "tofu", &["garlic"]);
        rated.average_rating = Some(5.0);
        let plain = recipe("plain", "tofu", &["garlic"]);
        let mut broader = recipe("broader", "garlic", &[]);
        broader.average_rating = Some(5.0);
        let miss = recipe("miss", "beef", &["onion"]);

        let ranked = rank_by_ingredients(
            vec![plain, miss, broader, rated],
            &targets(&["garlic"]),
            MatchMode::Any,
            10,
        );
        let ids: Vec<&str> = ranked.iter().map(|c| c.id().as_str()).collect();

        // broader: 15 * 0.7 + 0.3; rated: 3 * 0.7 + 0.3; plain: 3 * 0.7
        check!(ids == vec!["broader", "rated", "plain"]);
    }

    #[test]
    fn test_equal_scores_prefer_more_matched_targets() {
        // Both score 6 with no rating; the second matched two distinct targets
        let one_target = recipe("one", "beef", &["garlic paste", "garlic oil"]);
        let two_targets = recipe("two", "beef", &["garlic paste", "lemon juice"]);

        let ranked = rank_by_ingredients(
            vec![one_target, two_targets],
            &targets(&["garlic", "lemon"]),
            MatchMode::Any,
            10,
        );
        check!(ranked[0].id().as_str() == "two");
    }

    #[test]
    fn test_empty_targets_short_circuit() {
        let ranked = rank_by_ingredients(vec![recipe("r", "egg", &[])], &[], MatchMode::Any, 10);
        check!(ranked.is_empty());
    }

    #[test]
    fn test_limit_applied_after_ranking() {
        let recipes = (0..5).map(|i| recipe(&format!("r{i}"), "egg", &[])).collect();
        check!(rank_by_ingredients(recipes, &targets(&["egg"]), MatchMode::Any, 2).len() == 2);
    }
}
