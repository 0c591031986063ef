//! TF-IDF inverted index backing the reference lexical search.

use super::tokenize::{TermHash, Tokenizer, hash_term};
use ahash::{AHashMap, AHashSet};

/// Document identifier: position in the indexed collection.
pub(crate) type DocId = usize;

/// Accumulates weighted term frequencies before TF-IDF finalization.
#[derive(Default)]
pub(crate) struct IndexBuilder {
    /// Flat map from (term_hash, doc_id) to raw weighted TF
    term_docs: AHashMap<(TermHash, DocId), f32>,
    /// Total term count per document, for length normalization
    doc_lengths: AHashMap<DocId, usize>,
    doc_count: usize,
    tokenizer: Tokenizer,
}

impl IndexBuilder {
    /// Register a document so it counts toward IDF even if it has no terms.
    pub(crate) fn add_document(&mut self, doc_id: DocId) {
        self.doc_lengths.entry(doc_id).or_insert(0);
        self.doc_count = self.doc_count.max(doc_id + 1);
    }

    /// Add the terms of `text` to `doc_id`, each occurrence worth `weight`.
    pub(crate) fn add_field(&mut self, doc_id: DocId, text: &str, weight: f32) {
        self.add_document(doc_id);
        let counts = self.tokenizer.counts(text);

        let field_len: usize = counts.values().sum();
        *self.doc_lengths.entry(doc_id).or_insert(0) += field_len;

        for (term, count) in counts {
            *self
                .term_docs
                .entry((hash_term(&term), doc_id))
                .or_insert(0.0) += count as f32 * weight;
        }
    }

    /// Compute TF-IDF weights.
    ///
    /// `weight = ln(1 + tf_norm) * ln(1 + N / df)` where `tf_norm` is the weighted
    /// term frequency divided by the document's length relative to the average.
    pub(crate) fn finalize(self) -> LexicalIndex {
        let total_docs = self.doc_count as f32;
        let total_length: usize = self.doc_lengths.values().sum();
        let avg_doc_length = if self.doc_lengths.is_empty() || total_length == 0 {
            1.0
        } else {
            total_length as f32 / self.doc_lengths.len() as f32
        };

        let mut grouped: AHashMap<TermHash, Vec<(DocId, f32)>> = AHashMap::new();
        for ((term_hash, doc_id), tf) in self.term_docs {
            grouped.entry(term_hash).or_default().push((doc_id, tf));
        }

        let terms = grouped
            .into_iter()
            .map(|(term_hash, postings)| {
                let idf = (1.0 + total_docs / postings.len() as f32).ln();
                let mut weighted: Vec<(DocId, f32)> = postings
                    .into_iter()
                    .map(|(doc_id, tf)| {
                        let doc_length = self.doc_lengths.get(&doc_id).copied().unwrap_or(1) as f32;
                        // Clamp so very short documents are not over-rewarded
                        let length_norm = (doc_length / avg_doc_length).max(0.5);
                        (doc_id, (1.0 + tf / length_norm).ln() * idf)
                    })
                    .collect();
                weighted.sort_by_key(|(doc_id, _)| *doc_id);
                (term_hash, weighted)
            })
            .collect();

        LexicalIndex {
            terms,
            tokenizer: self.tokenizer,
        }
    }
}

/// Searchable term index.
pub(crate) struct LexicalIndex {
    /// Term hash to (doc_id, tf-idf) postings, sorted by doc id
    terms: AHashMap<TermHash, Vec<(DocId, f32)>>,
    tokenizer: Tokenizer,
}

impl LexicalIndex {
    /// Documents containing every query term, with their summed TF-IDF, best first.
    ///
    /// Ties keep document order. A query with no indexable terms matches nothing.
    pub(crate) fn search(&self, query: &str) -> Vec<(DocId, f32)> {
        let mut seen = AHashSet::new();
        let hashes: Vec<TermHash> = self
            .tokenizer
            .tokens(query)
            .iter()
            .map(|token| hash_term(token))
            .filter(|hash| seen.insert(*hash))
            .collect();

        let Some((first, rest)) = hashes.split_first() else {
            return Vec::new();
        };
        let Some(postings) = self.terms.get(first) else {
            return Vec::new();
        };

        let mut scores: AHashMap<DocId, f32> = postings.iter().copied().collect();
        for hash in rest {
            let Some(postings) = self.terms.get(hash) else {
                return Vec::new();
            };
            let matching: AHashMap<DocId, f32> = postings.iter().copied().collect();
            scores.retain(|doc_id, score| match matching.get(doc_id) {
                Some(extra) => {
                    *score += extra;
                    true
                }
                None => false,
            });
        }

        let mut results: Vec<(DocId, f32)> = scores.into_iter().collect();
        results.sort_by(|(a_id, a), (b_id, b)| b.total_cmp(a).then_with(|| a_id.cmp(b_id)));
        results
    }

    pub(crate) fn term_count(&self) -> usize {
        self.terms.len()
    }
}
