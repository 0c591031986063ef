//! Rank fusion: merging one or more backend result lists into a single ranking.
//!
//! All merging keys on the recipe id. Accumulation keeps the first copy of a recipe
//! it sees, and the final sort is stable, so ties keep first-seen order.

use crate::backend::{LexicalHit, SimilarityHit};
use crate::search::scoring::rated_score;
use crate::types::{Recipe, RecipeId, ScoredCandidate, Signals};
use ahash::AHashMap;

/// Hybrid fusion weights: `similarity * 0.6 + lexical_rank * 0.4`.
pub const SEMANTIC_WEIGHT: f32 = 0.6;
pub const LEXICAL_WEIGHT: f32 = 0.4;

/// Weight of the `index`-th query variant (0-based): `1 / (index + 1)`.
pub fn variant_weight(index: usize) -> f32 {
    1.0 / (index as f32 + 1.0)
}

/// Running scores keyed by recipe id, in first-seen order.
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    candidates: Vec<ScoredCandidate>,
    positions: AHashMap<RecipeId, usize>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `recipe`, created with a zero score on first sight.
    fn entry(&mut self, recipe: &Recipe) -> &mut ScoredCandidate {
        let index = match self.positions.get(&recipe.id) {
            Some(&index) => index,
            None => {
                let index = self.candidates.len();
                self.positions.insert(recipe.id.clone(), index);
                self.candidates.push(ScoredCandidate {
                    recipe: recipe.clone(),
                    score: 0.0,
                    signals: Signals::default(),
                });
                index
            }
        };
        &mut self.candidates[index]
    }

    /// Add a semantic contribution. The first similarity seen is the one reported.
    pub fn add_similarity(&mut self, hit: &SimilarityHit, weight: f32) {
        let candidate = self.entry(&hit.recipe);
        candidate.score += hit.similarity * weight;
        candidate.signals.similarity.get_or_insert(hit.similarity);
    }

    /// Add a lexical contribution. The first rank seen is the one reported.
    pub fn add_lexical(&mut self, hit: &LexicalHit, weight: f32) {
        let candidate = self.entry(&hit.recipe);
        candidate.score += hit.rank * weight;
        candidate.signals.lexical_rank.get_or_insert(hit.rank);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Sort by combined score, best first, and keep the top `limit`.
    pub fn into_ranked(self, limit: usize) -> Vec<ScoredCandidate> {
        let mut ranked = self.candidates;
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }
}

/// Multi-query weighted fusion.
///
/// `per_variant[i]` holds the hits for query variant `i`; each hit adds
/// `similarity * variant_weight(i)`, so recipes found by several variants rise.
pub fn fuse_variants(per_variant: &[Vec<SimilarityHit>], limit: usize) -> Vec<ScoredCandidate> {
    let mut accumulator = ScoreAccumulator::new();
    for (index, hits) in per_variant.iter().enumerate() {
        let weight = variant_weight(index);
        for hit in hits {
            accumulator.add_similarity(hit, weight);
        }
    }

    tracing::debug!(
        variants = per_variant.len(),
        candidates = accumulator.len(),
        limit,
        "Fused query variants"
    );
    accumulator.into_ranked(limit)
}

/// Semantic + lexical fusion. A recipe missing from one side scores 0 there.
pub fn fuse_hybrid(
    semantic: &[SimilarityHit],
    lexical: &[LexicalHit],
    limit: usize,
) -> Vec<ScoredCandidate> {
    let mut accumulator = ScoreAccumulator::new();
    for hit in semantic {
        accumulator.add_similarity(hit, SEMANTIC_WEIGHT);
    }
    for hit in lexical {
        accumulator.add_lexical(hit, LEXICAL_WEIGHT);
    }

    tracing::debug!(
        semantic = semantic.len(),
        lexical = lexical.len(),
        candidates = accumulator.len(),
        "Fused hybrid results"
    );
    accumulator.into_ranked(limit)
}

/// Single-signal pass-through: keep the backend's order, apply the limit.
///
/// The reported score is the rating-blended similarity the backend ranked by.
pub fn pass_through(hits: Vec<SimilarityHit>, limit: usize) -> Vec<ScoredCandidate> {
    hits.into_iter()
        .take(limit)
        .map(|hit| ScoredCandidate {
            score: rated_score(hit.similarity, hit.recipe.average_rating),
            signals: Signals {
                similarity: Some(hit.similarity),
                ..Signals::default()
            },
            recipe: hit.recipe,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    fn sim(id: &str, similarity: f32) -> SimilarityHit {
        SimilarityHit {
            recipe: Recipe::new(id, id, "rice"),
            similarity,
        }
    }

    fn lex(id: &str, rank: f32) -> LexicalHit {
        LexicalHit {
            recipe: Recipe::new(id, id, "rice"),
            rank,
        }
    }

    fn ids(ranked: &[ScoredCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.id().as_str()).collect()
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(1, 0.5)]
    #[case(3, 0.25)]
    fn test_variant_weight(#[case] index: usize, #[case] expected: f32) {
        check!((variant_weight(index) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_appearance_boosts_rank() {
        let per_variant = vec![vec![sim("b", 0.9), sim("a", 0.8)], vec![sim("a", 0.6)]];

        let ranked = fuse_variants(&per_variant, 10);

        check!(ids(&ranked) == vec!["a", "b"]);
        check!((ranked[0].score - 1.1).abs() < 1e-5);
        check!((ranked[1].score - 0.9).abs() < 1e-5);
        // First-seen similarity is reported
        check!(ranked[0].signals.similarity == Some(0.8));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let per_variant = vec![vec![sim("x", 0.5), sim("y", 0.5), sim("z", 0.5)]];
        check!(ids(&fuse_variants(&per_variant, 10)) == vec!["x", "y", "z"]);
    }

    #[test]
    fn test_fusion_truncates_after_merge() {
        let per_variant = vec![
            vec![sim("a", 0.9), sim("b", 0.8), sim("c", 0.1)],
            vec![sim("c", 0.9), sim("d", 0.7)],
        ];
        let ranked = fuse_variants(&per_variant, 2);
        check!(ids(&ranked) == vec!["a", "b"]);
    }

    #[test]
    fn test_hybrid_weights_and_missing_sides() {
        let ranked = fuse_hybrid(
            &[sim("a", 0.9), sim("b", 0.5)],
            &[lex("b", 1.0), lex("c", 0.4)],
            10,
        );

        let score = |id: &str| {
            ranked
                .iter()
                .find(|c| c.id().as_str() == id)
                .map(|c| c.score)
                .unwrap_or_default()
        };
        check!((score("a") - 0.54).abs() < 1e-5);
        check!((score("b") - 0.70).abs() < 1e-5);
        check!((score("c") - 0.16).abs() < 1e-5);
        check!(ids(&ranked) == vec!["b", "a", "c"]);

        let b = &ranked[0];
        check!(b.signals.similarity == Some(0.5));
        check!(b.signals.lexical_rank == Some(1.0));
    }

    #[test]
    fn test_hybrid_scores_independent_of_arrival_order() {
        let forward = fuse_hybrid(
            &[sim("a", 0.3), sim("b", 0.7)],
            &[lex("b", 0.2), lex("a", 0.8)],
            10,
        );
        let reversed = fuse_hybrid(
            &[sim("b", 0.7), sim("a", 0.3)],
            &[lex("a", 0.8), lex("b", 0.2)],
            10,
        );

        for candidate in &forward {
            let twin = reversed.iter().find(|c| c.id() == candidate.id());
            check!(twin.is_some_and(|t| (t.score - candidate.score).abs() < 1e-6));
        }
    }

    #[test]
    fn test_pass_through_keeps_backend_order() {
        let mut rated = sim("rated", 0.5);
        rated.recipe.average_rating = Some(5.0);
        let ranked = pass_through(vec![sim("first", 0.9), rated, sim("third", 0.4)], 2);

        check!(ids(&ranked) == vec!["first", "rated"]);
        check!((ranked[1].score - 0.65).abs() < 1e-5);
    }

    #[test]
    fn test_empty_inputs() {
        check!(fuse_variants(&[], 10).is_empty());
        check!(fuse_hybrid(&[], &[], 10).is_empty());
    }
}
