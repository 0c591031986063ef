//! Ingredient-name autocomplete over a static pantry dictionary.

use crate::search::scoring::{TextMatch, text_match};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Protein,
    Vegetable,
    Fruit,
    Dairy,
    Grain,
    HerbSpice,
    Condiment,
    Other,
}

/// How a dictionary name matched the query, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PantryMatch {
    Exact,
    Prefix,
    /// Query starts a later word of a multi-word name ("oil" in "olive oil").
    Word,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientSuggestion {
    pub name: &'static str,
    pub category: IngredientCategory,
    pub match_type: PantryMatch,
}

use IngredientCategory::{Condiment, Dairy, Fruit, Grain, HerbSpice, Other, Protein, Vegetable};

const PANTRY: &[(&str, IngredientCategory)] = &[
    // Proteins
    ("chicken", Protein),
    ("chicken breast", Protein),
    ("chicken thigh", Protein),
    ("ground beef", Protein),
    ("beef", Protein),
    ("steak", Protein),
    ("pork", Protein),
    ("pork belly", Protein),
    ("bacon", Protein),
    ("ham", Protein),
    ("sausage", Protein),
    ("lamb", Protein),
    ("turkey", Protein),
    ("duck", Protein),
    ("salmon", Protein),
    ("tuna", Protein),
    ("cod", Protein),
    ("shrimp", Protein),
    ("prawns", Protein),
    ("crab", Protein),
    ("mussels", Protein),
    ("squid", Protein),
    ("egg", Protein),
    ("tofu", Protein),
    ("tempeh", Protein),
    ("chickpeas", Protein),
    ("lentils", Protein),
    ("black beans", Protein),
    ("kidney beans", Protein),
    // Vegetables
    ("onion", Vegetable),
    ("red onion", Vegetable),
    ("spring onion", Vegetable),
    ("garlic", Vegetable),
    ("shallot", Vegetable),
    ("tomato", Vegetable),
    ("cherry tomato", Vegetable),
    ("potato", Vegetable),
    ("sweet potato", Vegetable),
    ("carrot", Vegetable),
    ("celery", Vegetable),
    ("bell pepper", Vegetable),
    ("chili pepper", Vegetable),
    ("jalapeno", Vegetable),
    ("broccoli", Vegetable),
    ("cauliflower", Vegetable),
    ("cabbage", Vegetable),
    ("spinach", Vegetable),
    ("kale", Vegetable),
    ("lettuce", Vegetable),
    ("cucumber", Vegetable),
    ("zucchini", Vegetable),
    ("eggplant", Vegetable),
    ("mushroom", Vegetable),
    ("shiitake mushroom", Vegetable),
    ("corn", Vegetable),
    ("peas", Vegetable),
    ("green beans", Vegetable),
    ("asparagus", Vegetable),
    ("bean sprouts", Vegetable),
    ("bok choy", Vegetable),
    ("pumpkin", Vegetable),
    ("beetroot", Vegetable),
    // Fruit
    ("lemon", Fruit),
    ("lime", Fruit),
    ("orange", Fruit),
    ("apple", Fruit),
    ("banana", Fruit),
    ("mango", Fruit),
    ("pineapple", Fruit),
    ("strawberry", Fruit),
    ("blueberry", Fruit),
    ("avocado", Fruit),
    ("coconut", Fruit),
    ("green papaya", Fruit),
    // Dairy
    ("milk", Dairy),
    ("butter", Dairy),
    ("cream", Dairy),
    ("sour cream", Dairy),
    ("yogurt", Dairy),
    ("cheddar cheese", Dairy),
    ("mozzarella", Dairy),
    ("parmesan", Dairy),
    ("feta cheese", Dairy),
    ("cream cheese", Dairy),
    // Grains and starches
    ("rice", Grain),
    ("jasmine rice", Grain),
    ("brown rice", Grain),
    ("pasta", Grain),
    ("spaghetti", Grain),
    ("rice noodles", Grain),
    ("egg noodles", Grain),
    ("bread", Grain),
    ("flour", Grain),
    ("oats", Grain),
    ("quinoa", Grain),
    ("couscous", Grain),
    ("tortilla", Grain),
    // Herbs and spices
    ("basil", HerbSpice),
    ("thai basil", HerbSpice),
    ("cilantro", HerbSpice),
    ("parsley", HerbSpice),
    ("mint", HerbSpice),
    ("rosemary", HerbSpice),
    ("thyme", HerbSpice),
    ("oregano", HerbSpice),
    ("ginger", HerbSpice),
    ("lemongrass", HerbSpice),
    ("cumin", HerbSpice),
    ("turmeric", HerbSpice),
    ("paprika", HerbSpice),
    ("cinnamon", HerbSpice),
    ("black pepper", HerbSpice),
    ("chili flakes", HerbSpice),
    ("curry powder", HerbSpice),
    ("garam masala", HerbSpice),
    // Condiments and sauces
    ("soy sauce", Condiment),
    ("fish sauce", Condiment),
    ("oyster sauce", Condiment),
    ("sesame oil", Condiment),
    ("olive oil", Condiment),
    ("vegetable oil", Condiment),
    ("rice vinegar", Condiment),
    ("balsamic vinegar", Condiment),
    ("coconut milk", Condiment),
    ("tomato paste", Condiment),
    ("mustard", Condiment),
    ("mayonnaise", Condiment),
    ("honey", Condiment),
    ("curry paste", Condiment),
    ("peanut butter", Condiment),
    // Everything else
    ("salt", Other),
    ("sugar", Other),
    ("brown sugar", Other),
    ("chicken stock", Other),
    ("vegetable stock", Other),
    ("peanuts", Other),
    ("cashews", Other),
    ("sesame seeds", Other),
    ("dark chocolate", Other),
];

fn classify(name: &str, query: &str) -> Option<PantryMatch> {
    match text_match(name, query)? {
        TextMatch::Exact => Some(PantryMatch::Exact),
        TextMatch::Prefix => Some(PantryMatch::Prefix),
        TextMatch::Contains => {
            let starts_word = name.split(' ').skip(1).any(|word| word.starts_with(query));
            Some(if starts_word {
                PantryMatch::Word
            } else {
                PantryMatch::Substring
            })
        }
    }
}

/// Dictionary names matching `query`, case-insensitively.
///
/// Ordered by match type (exact, prefix, word, substring), then shorter names,
/// then alphabetically.
pub fn suggest_ingredients(query: &str, limit: usize) -> Vec<IngredientSuggestion> {
    let query = query.trim().to_lowercase();

    let mut matches: Vec<IngredientSuggestion> = PANTRY
        .iter()
        .filter_map(|&(name, category)| {
            classify(name, &query).map(|match_type| IngredientSuggestion {
                name,
                category,
                match_type,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        a.match_type
            .cmp(&b.match_type)
            .then_with(|| a.name.len().cmp(&b.name.len()))
            .then_with(|| a.name.cmp(b.name))
    });
    matches.truncate(limit);
    matches
}
