//! Pairwise comparison primitives for relatedness scoring

use std::collections::HashSet;

/// Count candidate topics present in the source topic set.
///
/// Duplicate candidate topics each count separately; the caller decides
/// whether to deduplicate.
pub fn topic_overlap(source: &HashSet<String>, candidate: &[String]) -> usize {
    if source.is_empty() {
        return 0;
    }
    candidate.iter().filter(|t| source.contains(*t)).count()
}

/// Extract comparable words from a skill name.
///
/// Lowercases, strips everything outside `[a-z0-9\s-]`, splits on
/// whitespace/hyphen runs, and drops tokens of length <= 2.
pub fn name_words(name: &str) -> Vec<String> {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| w.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Count candidate-name words present in the source-name word set
pub fn name_word_overlap(source_words: &HashSet<String>, candidate: &str) -> usize {
    if source_words.is_empty() {
        return 0;
    }
    name_words(candidate)
        .iter()
        .filter(|w| source_words.contains(*w))
        .count()
}
