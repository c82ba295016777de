//! In-memory approximations of the store's text operators.
//!
//! Full-text phrase matching is word-sequence matching without stemming;
//! trigram similarity follows pg_trgm (lower-cased words padded with two
//! leading and one trailing space, Jaccard over the trigram sets).

use std::collections::HashSet;

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub fn phrase_matches(text: &str, phrase: &str) -> bool {
    let needle = words(phrase);
    if needle.is_empty() {
        return false;
    }
    let haystack = words(text);
    haystack.windows(needle.len()).any(|window| window == needle.as_slice())
}

pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.to_lowercase().starts_with(&prefix.to_lowercase())
}

pub fn contains_ignore_case(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(&needle.to_lowercase())
}

fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in words(text) {
        let padded: Vec<char> =
            "  ".chars().chain(word.chars()).chain(" ".chars()).collect();
        for gram in padded.windows(3) {
            set.insert([gram[0], gram[1], gram[2]]);
        }
    }
    set
}

pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}
