//! Natural-language query parsing: pulls structured filters out of free text.
//!
//! The extractor is a pure function over fixed regex tables. Matching is
//! case-insensitive; nothing here can fail, unmatched text simply yields an empty
//! [`FilterSet`].

use crate::search::FilterSet;
use crate::types::{DietaryFlags, Difficulty, MealType};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Minutes implied by "quick", "fast" or "easy" without an explicit time.
pub const QUICK_MINUTES: u32 = 30;

static TIME_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:in|within|under|less than)\s+(\d+)\s*(?:minutes?|mins?)\b")
});

static QUICK_WORD: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(?:quick|fast|easy)\b"));

/// Checked in order, first tier that matches wins.
static DIFFICULTY_TIERS: LazyLock<[(Regex, Difficulty); 3]> = LazyLock::new(|| {
    [
        (compile(r"(?i)\b(?:easy|simple|beginner)\b"), Difficulty::Easy),
        (compile(r"(?i)\b(?:medium|intermediate)\b"), Difficulty::Medium),
        (
            compile(r"(?i)\b(?:hard|difficult|advanced|challenging)\b"),
            Difficulty::Hard,
        ),
    ]
});

/// Every word the cleaner strips, time-rule words included.
static DIFFICULTY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(?:quick|fast|easy|simple|beginner|medium|intermediate|hard|difficult|advanced|challenging)\b",
    )
});

#[derive(Clone, Copy)]
enum DietFlag {
    Vegan,
    Vegetarian,
    GlutenFree,
    DairyFree,
    Keto,
    Paleo,
}

impl DietFlag {
    const fn set(self, flags: &mut DietaryFlags) {
        match self {
            Self::Vegan => flags.is_vegan = true,
            Self::Vegetarian => flags.is_vegetarian = true,
            Self::GlutenFree => flags.is_gluten_free = true,
            Self::DairyFree => flags.is_dairy_free = true,
            Self::Keto => flags.is_keto = true,
            Self::Paleo => flags.is_paleo = true,
        }
    }
}

static DIETARY_PATTERNS: LazyLock<[(Regex, DietFlag); 6]> = LazyLock::new(|| {
    [
        (compile(r"(?i)\b(?:vegan|plant-based)\b"), DietFlag::Vegan),
        (compile(r"(?i)\b(?:vegetarian|meatless)\b"), DietFlag::Vegetarian),
        (compile(r"(?i)\bgluten[- ]free\b"), DietFlag::GlutenFree),
        (
            compile(r"(?i)\b(?:dairy[- ]free|lactose free)\b"),
            DietFlag::DairyFree,
        ),
        (compile(r"(?i)\b(?:keto|ketogenic|low-carb)\b"), DietFlag::Keto),
        (compile(r"(?i)\b(?:paleo|paleolithic)\b"), DietFlag::Paleo),
    ]
});

/// Listed order matters: the first cuisine that matches is the only one inferred.
static CUISINE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\b(?:thai|thailand)\b", "Thai"),
        (r"(?i)\b(?:italian|italy)\b", "Italian"),
        (r"(?i)\b(?:japanese|japan)\b", "Japanese"),
        (r"(?i)\b(?:chinese|china)\b", "Chinese"),
        (r"(?i)\b(?:mexican|mexico)\b", "Mexican"),
        (r"(?i)\b(?:indian|india)\b", "Indian"),
        (r"(?i)\b(?:korean|korea)\b", "Korean"),
        (r"(?i)\b(?:vietnamese|vietnam)\b", "Vietnamese"),
        (r"(?i)\bmediterranean\b", "Mediterranean"),
        (r"(?i)\bamerican\b", "American"),
        (r"(?i)\b(?:french|france)\b", "French"),
    ]
    .into_iter()
    .map(|(pattern, cuisine)| (compile(pattern), cuisine))
    .collect()
});

static MEAL_PATTERNS: LazyLock<[(Regex, MealType); 5]> = LazyLock::new(|| {
    [
        (compile(r"(?i)\b(?:breakfast|morning)\b"), MealType::Breakfast),
        (compile(r"(?i)\b(?:lunch|noon)\b"), MealType::Lunch),
        (compile(r"(?i)\b(?:dinner|evening)\b"), MealType::Dinner),
        (compile(r"(?i)\b(?:snack|appetizer)\b"), MealType::Snack),
        (compile(r"(?i)\b(?:dessert|sweet)\b"), MealType::Dessert),
    ]
});

/// Patterns are literals checked by the tests below; a typo is a programming error.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern compiles")
}

/// A free-text query split into the text worth embedding and the filters it implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Query with time phrases and difficulty words removed (or the original text,
    /// if nothing would be left).
    pub cleaned: String,
    /// Filters inferred from the text.
    pub filters: FilterSet,
}

/// Extract structured filters from natural-language text.
///
/// Examples:
/// - `quick vegan thai dinner under 30 minutes` → maxPrepTime=30, difficulty={EASY},
///   cuisine=Thai, mealType={DINNER}, vegan; cleaned text `vegan thai dinner`
/// - `spicy japanese curry with chicken` → cuisine=Japanese, text unchanged
pub fn extract_filters(text: &str) -> ParsedQuery {
    let mut filters = FilterSet::default();

    // Time rule: explicit minutes first, then a bare "quick"-style word
    if let Some(minutes) = TIME_PHRASE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
    {
        filters.max_total_time = Some(minutes);
        filters.difficulty = Some(BTreeSet::from([Difficulty::Easy]));
    } else if QUICK_WORD.is_match(text) {
        filters.max_total_time = Some(QUICK_MINUTES);
        filters.difficulty = Some(BTreeSet::from([Difficulty::Easy]));
    }

    if filters.difficulty.is_none() {
        filters.difficulty = DIFFICULTY_TIERS
            .iter()
            .find(|(pattern, _)| pattern.is_match(text))
            .map(|(_, level)| BTreeSet::from([*level]));
    }

    let mut dietary = DietaryFlags::default();
    for (pattern, flag) in DIETARY_PATTERNS.iter() {
        if pattern.is_match(text) {
            flag.set(&mut dietary);
        }
    }
    filters.dietary_info = dietary.any().then_some(dietary);

    filters.cuisine_type = CUISINE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, cuisine)| (*cuisine).to_string());

    let meals: BTreeSet<MealType> = MEAL_PATTERNS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(text))
        .map(|(_, meal)| *meal)
        .collect();
    if !meals.is_empty() {
        filters.meal_type = Some(meals);
    }

    let cleaned = clean_query(text, &filters);
    if !filters.is_empty() {
        tracing::debug!(query = text, cleaned = %cleaned, ?filters, "Extracted query filters");
    }

    ParsedQuery { cleaned, filters }
}

/// Strip time phrases and difficulty words, then collapse whitespace.
///
/// Text that implied no filter comes back untouched; so does text that would be
/// left empty.
fn clean_query(text: &str, filters: &FilterSet) -> String {
    if filters.is_empty() {
        return text.to_string();
    }

    let without_time = TIME_PHRASE.replace_all(text, " ");
    let without_levels = DIFFICULTY_WORDS.replace_all(&without_time, " ");
    let collapsed = without_levels.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        text.to_string()
    } else {
        collapsed
    }
}
