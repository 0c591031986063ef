//! Recipe records, scored results and request types shared across the crate.

use crate::error::SearchError;
use crate::search::FilterSet;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest result limit any search operation accepts.
pub const MAX_LIMIT: usize = 50;
/// Result limit used when the caller does not supply one.
pub const DEFAULT_LIMIT: usize = 10;
/// Longest accepted search query, in characters.
pub const MAX_QUERY_CHARS: usize = 500;
/// Largest limit for autocomplete suggestions.
pub const MAX_SUGGESTION_LIMIT: usize = 20;
/// Longest accepted autocomplete prefix, in characters.
pub const MAX_PREFIX_CHARS: usize = 100;
/// Longest accepted pantry ingredient query, in characters.
pub const MAX_PANTRY_QUERY_CHARS: usize = 50;
/// Largest limit for pantry ingredient suggestions.
pub const MAX_PANTRY_LIMIT: usize = 30;

/// Opaque, unique recipe identifier. All merging keys on it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecipeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

impl MealType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "BREAKFAST",
            Self::Lunch => "LUNCH",
            Self::Dinner => "DINNER",
            Self::Snack => "SNACK",
            Self::Dessert => "DESSERT",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Moderation state of a recipe. Only approved recipes are searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeStatus {
    #[default]
    Approved,
    Pending,
    Rejected,
}

/// Boolean dietary flags, serialized with the `isVegan`-style keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase", default)]
pub struct DietaryFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub is_vegan: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_vegetarian: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_gluten_free: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_dairy_free: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_keto: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_paleo: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl DietaryFlags {
    pub fn any(&self) -> bool {
        self.is_vegan
            || self.is_vegetarian
            || self.is_gluten_free
            || self.is_dairy_free
            || self.is_keto
            || self.is_paleo
    }

    /// True when every flag set in `required` is also set here.
    pub fn satisfies(&self, required: &Self) -> bool {
        (!required.is_vegan || self.is_vegan)
            && (!required.is_vegetarian || self.is_vegetarian)
            && (!required.is_gluten_free || self.is_gluten_free)
            && (!required.is_dairy_free || self.is_dairy_free)
            && (!required.is_keto || self.is_keto)
            && (!required.is_paleo || self.is_paleo)
    }

    /// Human-readable labels in a fixed order.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.is_vegetarian, "vegetarian"),
            (self.is_vegan, "vegan"),
            (self.is_gluten_free, "gluten-free"),
            (self.is_dairy_free, "dairy-free"),
            (self.is_keto, "keto"),
            (self.is_paleo, "paleo"),
        ]
        .into_iter()
        .filter_map(|(set, label)| set.then_some(label))
        .collect()
    }
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl IngredientLine {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            unit: None,
        }
    }
}

/// A recipe row as the backends return it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub main_ingredient: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub meal_type: Vec<MealType>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub prep_time: u32,
    #[serde(default)]
    pub cooking_time: u32,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub average_rating: Option<f32>,
    #[serde(default)]
    pub total_ratings: u32,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub status: RecipeStatus,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub dietary_info: DietaryFlags,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl Recipe {
    /// Minimal approved recipe; the remaining fields take their defaults.
    pub fn new(
        id: impl Into<RecipeId>,
        title: impl Into<String>,
        main_ingredient: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            main_ingredient: main_ingredient.into(),
            ingredients: Vec::new(),
            cuisine_type: None,
            meal_type: Vec::new(),
            difficulty: None,
            prep_time: 0,
            cooking_time: 0,
            servings: None,
            average_rating: None,
            total_ratings: 0,
            image_urls: Vec::new(),
            status: RecipeStatus::Approved,
            author_id: None,
            dietary_info: DietaryFlags::default(),
            allergies: Vec::new(),
        }
    }

    /// Preparation plus cooking time in minutes.
    pub fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cooking_time)
    }

    pub fn is_approved(&self) -> bool {
        self.status == RecipeStatus::Approved
    }
}

impl From<String> for RecipeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Named sub-scores carried alongside a candidate's combined score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Signals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(rename = "rank", skip_serializing_if = "Option::is_none")]
    pub lexical_rank: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_count: Option<u32>,
}

/// A recipe with its combined relevance score. Identity is the recipe id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(rename = "combined_score")]
    pub score: f32,
    #[serde(flatten)]
    pub signals: Signals,
}

impl ScoredCandidate {
    pub fn id(&self) -> &RecipeId {
        &self.recipe.id
    }
}

/// `any` (union) vs `all` (intersection) semantics for ingredient queries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Any,
    All,
}

impl FromStr for MatchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            other => Err(SearchError::invalid(
                "match_mode",
                format!("expected 'any' or 'all', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Any => "any",
            Self::All => "all",
        })
    }
}

const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Free-text search request shared by plain, smart and hybrid search.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search query text (1-500 characters), e.g. "quick vegan thai dinner under 30 minutes"
    pub query: String,
    /// Maximum number of results (1-50, default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Optional filters (mealType, difficulty, maxPrepTime, cuisineType, dietaryInfo)
    #[serde(default)]
    pub filters: Option<FilterSet>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
            filters: None,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = Some(filters);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SearchError> {
        validate_text("query", &self.query, MAX_QUERY_CHARS)?;
        validate_limit("limit", self.limit, MAX_LIMIT)
    }
}

/// Ingredient-list search request.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct IngredientSearchRequest {
    /// Ingredient names, e.g. ["chicken", "garlic"]
    pub ingredients: Vec<String>,
    /// Maximum number of results (1-50, default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Optional filters (mealType, difficulty, maxPrepTime, cuisineType)
    #[serde(default)]
    pub filters: Option<FilterSet>,
    /// "any" (default) matches recipes with any ingredient, "all" requires every one
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl IngredientSearchRequest {
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            limit: DEFAULT_LIMIT,
            filters: None,
            match_mode: MatchMode::Any,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = Some(filters);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SearchError> {
        if self.ingredients.is_empty() {
            return Err(SearchError::invalid(
                "ingredients",
                "at least one ingredient is required",
            ));
        }
        validate_limit("limit", self.limit, MAX_LIMIT)
    }
}

/// Autocomplete request for the search box.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SuggestionRequest {
    /// Partial search term (1-100 characters)
    pub query: String,
    /// Maximum number of suggestions (1-20, default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl SuggestionRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SearchError> {
        validate_text("query", &self.query, MAX_PREFIX_CHARS)?;
        validate_limit("limit", self.limit, MAX_SUGGESTION_LIMIT)
    }
}

/// Ingredient-name autocomplete request.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct PantryRequest {
    /// Partial ingredient name (1-50 characters), e.g. "chick"
    pub query: String,
    /// Maximum number of suggestions (1-30, default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl PantryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SearchError> {
        validate_text("query", &self.query, MAX_PANTRY_QUERY_CHARS)?;
        validate_limit("limit", self.limit, MAX_PANTRY_LIMIT)
    }
}

pub(crate) fn validate_text(
    field: &'static str,
    text: &str,
    max_chars: usize,
) -> Result<(), SearchError> {
    if text.trim().is_empty() {
        return Err(SearchError::invalid(field, "must not be empty"));
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(SearchError::invalid(
            field,
            format!("must be at most {} characters, got {}", max_chars, chars),
        ));
    }
    Ok(())
}

pub(crate) fn validate_limit(
    field: &'static str,
    limit: usize,
    max: usize,
) -> Result<(), SearchError> {
    if (1..=max).contains(&limit) {
        Ok(())
    } else {
        Err(SearchError::invalid(
            field,
            format!("must be between 1 and {}, got {}", max, limit),
        ))
    }
}
