//! The closed set of structured search constraints and its merge rule.

use crate::types::{DietaryFlags, Difficulty, MealType, Recipe};
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured search constraints. Every key is optional; a key is "present" when `Some`.
///
/// Serialized with the camelCase keys callers already send (`mealType`, `difficulty`,
/// `maxPrepTime`, `cuisineType`, `dietaryInfo`). Unknown keys are rejected.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterSet {
    /// Meal types; a recipe matches when it shares at least one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<BTreeSet<MealType>>,
    /// Accepted difficulty levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<BTreeSet<Difficulty>>,
    /// Upper bound on preparation plus cooking time, in minutes.
    #[serde(
        default,
        rename = "maxPrepTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_total_time: Option<u32>,
    /// Cuisine name, compared case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    /// Required dietary flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_info: Option<DietaryFlags>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge inferred filters with caller-supplied ones.
    ///
    /// Precedence is per key: a key present in `manual` always wins, a key present only
    /// in `inferred` survives. Neither input is modified.
    pub fn merged(inferred: &Self, manual: &Self) -> Self {
        Self {
            meal_type: manual.meal_type.clone().or_else(|| inferred.meal_type.clone()),
            difficulty: manual
                .difficulty
                .clone()
                .or_else(|| inferred.difficulty.clone()),
            max_total_time: manual.max_total_time.or(inferred.max_total_time),
            cuisine_type: manual
                .cuisine_type
                .clone()
                .or_else(|| inferred.cuisine_type.clone()),
            dietary_info: manual.dietary_info.or(inferred.dietary_info),
        }
    }

    /// Row-level filter semantics applied by the reference backend.
    ///
    /// Empty sets impose no constraint.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(meal_types) = self.meal_type.as_ref().filter(|set| !set.is_empty())
            && !recipe.meal_type.iter().any(|meal| meal_types.contains(meal))
        {
            return false;
        }

        if let Some(levels) = self.difficulty.as_ref().filter(|set| !set.is_empty())
            && !recipe.difficulty.is_some_and(|level| levels.contains(&level))
        {
            return false;
        }

        if let Some(max) = self.max_total_time
            && recipe.total_time() > max
        {
            return false;
        }

        if let Some(cuisine) = &self.cuisine_type
            && !recipe
                .cuisine_type
                .as_deref()
                .is_some_and(|value| value.to_lowercase() == cuisine.to_lowercase())
        {
            return false;
        }

        if let Some(required) = &self.dietary_info
            && !recipe.dietary_info.satisfies(required)
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    fn curry() -> Recipe {
        let mut recipe = Recipe::new("r1", "Thai Green Curry", "Chicken");
        recipe.cuisine_type = Some("Thai".to_string());
        recipe.meal_type = vec![MealType::Dinner];
        recipe.difficulty = Some(Difficulty::Medium);
        recipe.prep_time = 15;
        recipe.cooking_time = 20;
        recipe.dietary_info.is_gluten_free = true;
        recipe
    }

    #[test]
    fn test_manual_wins_inferred_survives() {
        let manual = FilterSet {
            cuisine_type: Some("Italian".to_string()),
            ..FilterSet::default()
        };
        let inferred = FilterSet {
            cuisine_type: Some("Thai".to_string()),
            max_total_time: Some(30),
            ..FilterSet::default()
        };

        let merged = FilterSet::merged(&inferred, &manual);

        check!(merged.cuisine_type.as_deref() == Some("Italian"));
        check!(merged.max_total_time == Some(30));
        check!(merged.meal_type.is_none());
        // Inputs are untouched
        check!(inferred.cuisine_type.as_deref() == Some("Thai"));
    }

    #[test]
    fn test_merge_is_per_key_not_per_value() {
        let manual = FilterSet {
            difficulty: Some(BTreeSet::from([Difficulty::Hard])),
            ..FilterSet::default()
        };
        let inferred = FilterSet {
            difficulty: Some(BTreeSet::from([Difficulty::Easy])),
            meal_type: Some(BTreeSet::from([MealType::Dinner])),
            ..FilterSet::default()
        };

        let merged = FilterSet::merged(&inferred, &manual);
        check!(merged.difficulty == Some(BTreeSet::from([Difficulty::Hard])));
        check!(merged.meal_type == Some(BTreeSet::from([MealType::Dinner])));
    }

    #[test]
    fn test_deserializes_wire_keys() {
        let json =
            r#"{"cuisineType": "Italian", "maxPrepTime": 30, "mealType": ["LUNCH", "DINNER"]}"#;
        let_assert!(Ok(filters) = serde_json::from_str::<FilterSet>(json));
        check!(filters.cuisine_type.as_deref() == Some("Italian"));
        check!(filters.max_total_time == Some(30));
        check!(filters.meal_type.map(|set| set.len()) == Some(2));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        check!(serde_json::from_str::<FilterSet>(r#"{"spiciness": 3}"#).is_err());
    }

    fn meals(items: &[MealType]) -> FilterSet {
        FilterSet {
            meal_type: Some(items.iter().copied().collect()),
            ..FilterSet::default()
        }
    }

    fn diet(flags: DietaryFlags) -> FilterSet {
        FilterSet {
            dietary_info: Some(flags),
            ..FilterSet::default()
        }
    }

    #[rstest]
    #[case(FilterSet::default(), true)]
    #[case(FilterSet { cuisine_type: Some("THAI".into()), ..FilterSet::default() }, true)]
    #[case(FilterSet { cuisine_type: Some("Italian".into()), ..FilterSet::default() }, false)]
    #[case(FilterSet { max_total_time: Some(35), ..FilterSet::default() }, true)]
    #[case(FilterSet { max_total_time: Some(30), ..FilterSet::default() }, false)]
    #[case(meals(&[MealType::Lunch, MealType::Dinner]), true)]
    #[case(meals(&[MealType::Breakfast]), false)]
    #[case(meals(&[]), true)]
    #[case(FilterSet { difficulty: Some([Difficulty::Easy].into()), ..Default::default() }, false)]
    #[case(diet(DietaryFlags { is_gluten_free: true, ..DietaryFlags::default() }), true)]
    #[case(diet(DietaryFlags { is_vegan: true, ..DietaryFlags::default() }), false)]
    fn test_matches(#[case] filters: FilterSet, #[case] expected: bool) {
        check!(filters.matches(&curry()) == expected);
    }
}
