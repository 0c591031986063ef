//! Query expansion: a handful of synonym variants of a cleaned query.
//!
//! Variants come from a curated culinary synonym table first, then (only while
//! there is room) from an optional general-purpose thesaurus. A missing or failing
//! thesaurus only narrows coverage; expansion itself cannot fail.

use ahash::AHashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Most variants returned, the original query included.
pub const MAX_VARIANTS: usize = 5;

/// Curated synonyms tried per matching word.
const CURATED_PER_WORD: usize = 2;
/// Thesaurus senses consulted per word, and lemmas taken per sense.
const SENSES_PER_WORD: usize = 2;
const LEMMAS_PER_SENSE: usize = 2;
/// Words shorter than this are never sent to the thesaurus.
const MIN_THESAURUS_WORD: usize = 4;
const MIN_SYNONYM_CHARS: usize = 3;

/// Culinary synonyms, most useful first.
const CULINARY_SYNONYMS: &[(&str, &[&str])] = &[
    // Preparation and character
    ("healthy", &["nutritious", "wholesome", "clean"]),
    ("quick", &["fast", "rapid", "speedy", "swift"]),
    ("easy", &["simple", "basic", "straightforward"]),
    ("delicious", &["tasty", "flavorful", "savory"]),
    ("spicy", &["hot", "fiery", "pungent", "zesty"]),
    ("mild", &["gentle", "subtle", "light"]),
    ("rich", &["creamy", "decadent", "indulgent"]),
    ("light", &["refreshing", "crisp", "fresh"]),
    // Meals
    ("breakfast", &["morning meal", "brunch"]),
    ("lunch", &["midday meal", "luncheon"]),
    ("dinner", &["evening meal", "supper"]),
    ("snack", &["appetizer", "bite", "nibble"]),
    ("dessert", &["sweet", "treat"]),
    // Proteins
    ("chicken", &["poultry", "fowl"]),
    ("beef", &["steak", "meat"]),
    ("pork", &["ham", "bacon"]),
    ("fish", &["seafood"]),
    ("tofu", &["bean curd", "soy"]),
    // Diets
    ("vegetarian", &["plant-based", "meatless", "veggie"]),
    ("vegan", &["plant-based", "dairy-free"]),
    ("low-carb", &["keto", "ketogenic", "low-carbohydrate"]),
    ("gluten-free", &["wheat-free"]),
    // Cooking methods
    ("grilled", &["barbecued", "charred", "broiled"]),
    ("fried", &["pan-fried", "deep-fried", "crispy"]),
    ("baked", &["roasted", "oven-cooked"]),
    ("steamed", &["boiled", "poached"]),
    ("raw", &["fresh", "uncooked"]),
    // Textures
    ("crispy", &["crunchy", "crisp"]),
    ("creamy", &["smooth", "velvety"]),
    ("tender", &["soft", "juicy"]),
    ("chewy", &["firm", "dense"]),
];

fn curated_synonyms(word: &str) -> Option<&'static [&'static str]> {
    CULINARY_SYNONYMS
        .iter()
        .find(|(entry, _)| *entry == word)
        .map(|(_, synonyms)| *synonyms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    Adjective,
}

/// Failure of the secondary synonym source. Never escapes this module.
#[derive(Debug, thiserror::Error)]
pub enum ThesaurusError {
    #[error("thesaurus unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read thesaurus: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed thesaurus: {0}")]
    Parse(#[from] serde_json::Error),
}

/// General-purpose synonym source, consulted after the curated table.
pub trait Thesaurus: Send + Sync {
    /// Senses of `word` for one part of speech, most common first. Each sense is
    /// a list of lemma forms; multi-word lemmas may use `_` between words.
    fn senses(&self, word: &str, pos: PartOfSpeech) -> Result<Vec<Vec<String>>, ThesaurusError>;
}

#[derive(Debug, Default, Deserialize)]
struct WordSenses {
    #[serde(default)]
    noun: Vec<Vec<String>>,
    #[serde(default)]
    adjective: Vec<Vec<String>>,
}

/// Thesaurus backed by a JSON word list:
///
/// ```json
/// { "lamb": { "noun": [["lamb", "young_sheep"]], "adjective": [] } }
/// ```
#[derive(Debug, Default)]
pub struct WordListThesaurus {
    words: AHashMap<String, WordSenses>,
}

impl WordListThesaurus {
    pub fn from_json(json: &str) -> Result<Self, ThesaurusError> {
        let raw: AHashMap<String, WordSenses> = serde_json::from_str(json)?;
        let words = raw
            .into_iter()
            .map(|(word, senses)| (word.to_lowercase(), senses))
            .collect();
        Ok(Self { words })
    }

    pub async fn load(path: &Path) -> Result<Self, ThesaurusError> {
        let json = tokio::fs::read_to_string(path).await?;
        let thesaurus = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            words = thesaurus.words.len(),
            "Loaded thesaurus"
        );
        Ok(thesaurus)
    }
}

impl Thesaurus for WordListThesaurus {
    fn senses(&self, word: &str, pos: PartOfSpeech) -> Result<Vec<Vec<String>>, ThesaurusError> {
        Ok(self
            .words
            .get(word)
            .map(|entry| match pos {
                PartOfSpeech::Noun => entry.noun.clone(),
                PartOfSpeech::Adjective => entry.adjective.clone(),
            })
            .unwrap_or_default())
    }
}

/// Ordered, duplicate-free variant list with a hard cap.
struct Variants {
    words: Vec<String>,
    normalized: String,
    lowercase: String,
    list: Vec<String>,
}

impl Variants {
    fn new(query: &str) -> Self {
        let lowercase = query.to_lowercase();
        let words: Vec<String> = lowercase.split_whitespace().map(str::to_string).collect();
        Self {
            normalized: words.join(" "),
            words,
            lowercase,
            list: vec![query.to_string()],
        }
    }

    fn is_full(&self) -> bool {
        self.list.len() >= MAX_VARIANTS
    }

    /// Substitute `synonym` for the word at `position` and keep the result if new.
    fn substitute(&mut self, position: usize, synonym: &str) {
        let variant = self
            .words
            .iter()
            .enumerate()
            .map(|(i, word)| if i == position { synonym } else { word.as_str() })
            .collect::<Vec<_>>()
            .join(" ");

        if variant != self.normalized && variant != self.lowercase && !self.list.contains(&variant)
        {
            self.list.push(variant);
        }
    }
}

/// Produces up to [`MAX_VARIANTS`] related phrasings of a query.
#[derive(Clone, Default)]
pub struct QueryExpander {
    thesaurus: Option<Arc<dyn Thesaurus>>,
}

impl std::fmt::Debug for QueryExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExpander")
            .field("thesaurus", &self.thesaurus.is_some())
            .finish()
    }
}

impl QueryExpander {
    /// Expander using only the curated table.
    pub fn curated() -> Self {
        Self::default()
    }

    pub fn with_thesaurus(thesaurus: Arc<dyn Thesaurus>) -> Self {
        Self {
            thesaurus: Some(thesaurus),
        }
    }

    /// Expand `query` into at most [`MAX_VARIANTS`] strings.
    ///
    /// The first element is always `query` itself, unchanged. Later elements are
    /// lowercase copies with exactly one word replaced by a synonym.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let mut variants = Variants::new(query);

        for position in 0..variants.words.len() {
            let Some(synonyms) = curated_synonyms(&variants.words[position]) else {
                continue;
            };
            for synonym in synonyms.iter().take(CURATED_PER_WORD) {
                variants.substitute(position, synonym);
                if variants.is_full() {
                    return variants.list;
                }
            }
        }

        if let Some(thesaurus) = &self.thesaurus {
            let curated_len = variants.list.len();
            if let Err(e) = expand_from_thesaurus(thesaurus.as_ref(), &mut variants) {
                tracing::warn!(
                    query,
                    error = %e,
                    "Thesaurus lookup failed, using curated synonyms only"
                );
                variants.list.truncate(curated_len);
            }
        }

        tracing::debug!(query, variants = ?variants.list, "Expanded query");
        variants.list
    }
}

fn expand_from_thesaurus(
    thesaurus: &dyn Thesaurus,
    variants: &mut Variants,
) -> Result<(), ThesaurusError> {
    for position in 0..variants.words.len() {
        if variants.is_full() {
            return Ok(());
        }

        let word = variants.words[position].clone();
        if word.chars().count() < MIN_THESAURUS_WORD || curated_synonyms(&word).is_some() {
            continue;
        }

        let mut senses = thesaurus.senses(&word, PartOfSpeech::Noun)?;
        if senses.is_empty() {
            senses = thesaurus.senses(&word, PartOfSpeech::Adjective)?;
        }

        for sense in senses.iter().take(SENSES_PER_WORD) {
            for lemma in sense.iter().take(LEMMAS_PER_SENSE) {
                let synonym = lemma.replace('_', " ").to_lowercase();
                if synonym == word
                    || synonym.chars().count() < MIN_SYNONYM_CHARS
                    || synonym.chars().any(|c| c.is_ascii_digit())
                {
                    continue;
                }
                variants.substitute(position, &synonym);
                if variants.is_full() {
                    return Ok(());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    struct FailingThesaurus;

    impl Thesaurus for FailingThesaurus {
        fn senses(&self, _: &str, _: PartOfSpeech) -> Result<Vec<Vec<String>>, ThesaurusError> {
            Err(ThesaurusError::Unavailable("corpus not installed".to_string()))
        }
    }

    fn word_list() -> Arc<dyn Thesaurus> {
        let json = r#"{
            "lamb": {"noun": [["lamb", "young_sheep"], ["Lamb", "dear"], ["third_sense", "x"]]},
            "shank": {"noun": [["shank", "shin", "leg"]]},
            "braised": {"adjective": [["stewed"]]},
            "stew": {"noun": [["stew", "ox"], ["vitamin_b12"]]}
        }"#;
        let_assert!(Ok(thesaurus) = WordListThesaurus::from_json(json));
        Arc::new(thesaurus)
    }

    #[test]
    fn test_curated_expansion_caps_at_five() {
        let variants = QueryExpander::curated().expand("healthy chicken dinner");
        check!(
            variants
                == vec![
                    "healthy chicken dinner",
                    "nutritious chicken dinner",
                    "wholesome chicken dinner",
                    "healthy poultry dinner",
                    "healthy fowl dinner",
                ]
        );
    }

    #[test]
    fn test_original_kept_verbatim() {
        let variants = QueryExpander::curated().expand("Spicy Tofu");
        check!(variants[0] == "Spicy Tofu");
        check!(variants[1] == "hot tofu");
        check!(variants.contains(&"spicy bean curd".to_string()));
    }

    #[test]
    fn test_words_without_synonyms_left_alone() {
        let variants = QueryExpander::curated().expand("fish tacos");
        check!(variants == vec!["fish tacos", "seafood tacos"]);
    }

    #[rstest]
    #[case("healthy chicken dinner")]
    #[case("quick easy spicy vegan lunch")]
    #[case("grandma's meatballs")]
    #[case("raw raw raw")]
    #[case("CRISPY fried chicken")]
    fn test_expansion_shape(#[case] query: &str) {
        let variants = QueryExpander::with_thesaurus(word_list()).expand(query);

        check!(!variants.is_empty());
        check!(variants.len() <= MAX_VARIANTS);
        check!(variants[0] == query);
        let mut deduped = variants.clone();
        deduped.sort();
        deduped.dedup();
        check!(deduped.len() == variants.len());
    }

    #[test]
    fn test_thesaurus_fills_remaining_slots() {
        let variants = QueryExpander::with_thesaurus(word_list()).expand("braised lamb shank");
        check!(
            variants
                == vec![
                    "braised lamb shank",
                    "stewed lamb shank",
                    "braised young sheep shank",
                    "braised dear shank",
                    "braised lamb shin",
                ]
        );
    }

    #[test]
    fn test_thesaurus_skips_short_and_numeric_synonyms() {
        let variants = QueryExpander::with_thesaurus(word_list()).expand("beef stew");
        check!(variants == vec!["beef stew", "steak stew", "meat stew"]);
    }

    #[test]
    fn test_thesaurus_not_consulted_for_curated_words() {
        let variants = QueryExpander::with_thesaurus(Arc::new(FailingThesaurus)).expand("beef");
        check!(variants == vec!["beef", "steak", "meat"]);
    }

    #[test]
    fn test_failing_thesaurus_falls_back_to_curated() {
        let variants =
            QueryExpander::with_thesaurus(Arc::new(FailingThesaurus)).expand("spicy lamb");
        check!(variants == vec!["spicy lamb", "hot lamb", "fiery lamb"]);
    }

    #[test]
    fn test_malformed_word_list_is_an_error() {
        check!(WordListThesaurus::from_json("[1, 2]").is_err());
    }
}
