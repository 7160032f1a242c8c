/// Whitespace-delimited query tokens, duplicates kept.
pub fn tokenize(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Number of tokens contained in `text` as literal, case-sensitive substrings.
///
/// A token embedded in a longer word still counts (`王` matches `国王`).
pub fn overlap_score(tokens: &[&str], text: &str) -> usize {
    tokens.iter().filter(|t| text.contains(**t)).count()
}
