//! Text tokenization and stemming for the lexical index and the hashing embedder.

use ahash::AHashMap;
use rust_stemmers::{Algorithm, Stemmer};
use xxhash_rust::xxh3::xxh3_64;

/// Common English stop words, never indexed.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "into", "is",
    "it", "its", "of", "on", "or", "that", "the", "to", "was", "will", "with",
];

/// Term hash for fast lookup.
pub(crate) type TermHash = u64;

/// English tokenizer with a reusable stemmer.
pub(crate) struct Tokenizer {
    stemmer: Stemmer,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Tokenizer {
    /// Split `text` into lowercase stemmed terms.
    ///
    /// Words are runs of alphanumerics; a hyphenated word yields each part and
    /// the joined compound, so "gluten-free" gives "gluten", "free" and "glutenfre".
    pub(crate) fn tokens(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();

        for word in text.split(|c: char| !(c.is_alphanumeric() || c == '-')) {
            let parts: Vec<&str> = word.split('-').filter(|part| !part.is_empty()).collect();
            match parts.as_slice() {
                [] => {}
                [single] => self.push(single, &mut tokens),
                many => {
                    for part in many {
                        self.push(part, &mut tokens);
                    }
                    self.push(&many.concat(), &mut tokens);
                }
            }
        }

        tokens
    }

    /// Term counts for `text`.
    pub(crate) fn counts(&self, text: &str) -> AHashMap<String, usize> {
        let words = self.tokens(text);
        let mut counts: AHashMap<String, usize> = AHashMap::with_capacity(words.len());
        for word in words {
            *counts.entry(word).or_insert(0) += 1;
        }
        counts
    }

    fn push(&self, token: &str, tokens: &mut Vec<String>) {
        let lowercase = token.to_lowercase();
        if STOP_WORDS.contains(&lowercase.as_str()) {
            return;
        }
        tokens.push(self.stemmer.stem(&lowercase).into_owned());
    }
}

/// Hashes a term for fast lookup (case-insensitive).
pub(crate) fn hash_term(term: &str) -> TermHash {
    xxh3_64(term.to_lowercase().as_bytes())
}
