use serde::{Deserialize, Serialize};

use crate::corpus::{CorpusCache, CorpusRecord};

mod lexical;

pub use lexical::{overlap_score, tokenize};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub score: usize,
    pub text: String,
}

/// Rank records by term overlap with `query`.
///
/// Zero-score records are dropped. Ties keep corpus order (stable sort).
pub fn rank(records: &[CorpusRecord], query: &str, top_k: usize) -> Vec<ScoredRecord> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(usize, &CorpusRecord)> = records
        .iter()
        .map(|r| (overlap_score(&tokens, &r.text), r))
        .filter(|(score, _)| *score > 0)
        .collect();

    hits.sort_by(|a, b| b.0.cmp(&a.0));
    hits.truncate(top_k);

    hits.into_iter()
        .map(|(score, r)| ScoredRecord {
            score,
            text: r.text.clone(),
        })
        .collect()
}

/// Context text for `query`: top-k record texts joined by newline, or empty.
pub fn retrieve(corpus: &CorpusCache, query: &str, top_k: usize) -> String {
    if tokenize(query).is_empty() {
        return String::new();
    }
    let records = corpus.load();
    if records.is_empty() {
        return String::new();
    }
    rank(records, query, top_k)
        .into_iter()
        .map(|h| h.text)
        .collect::<Vec<_>>()
        .join("\n")
}
