//! Lexical similarity primitives.
//!
//! Tokenization is lowercase whitespace splitting — no stemming, no
//! punctuation handling. Similarity is the Jaccard index over token
//! sets, which is the observable contract for both link formation and
//! recall scoring.

use std::collections::HashSet;

/// Tokenize text into lowercase whitespace-separated words.
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Distinct lowercase tokens of a text.
pub fn token_set(text: &str) -> HashSet<String> {
    tokens(text).into_iter().collect()
}

/// Jaccard index of two token sets: |A ∩ B| / |A ∪ B|.
/// Zero when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Jaccard similarity of two texts.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaccard(&token_set(a), &token_set(b))
}

/// Initial resonance of new content: `0.5 + 0.5 · (distinct / total)`.
/// Higher lexical diversity yields higher starting resonance; empty
/// content bottoms out at 0.5.
pub fn initial_resonance(content: &str) -> f64 {
    let words = tokens(content);
    let diversity = if words.is_empty() {
        0.0
    } else {
        let distinct: HashSet<&String> = words.iter().collect();
        distinct.len() as f64 / words.len() as f64
    };
    0.5 + 0.5 * diversity
}
