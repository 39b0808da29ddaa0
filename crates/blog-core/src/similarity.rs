//! Trigram similarity, matching PostgreSQL's `pg_trgm` `similarity()`.
//!
//! Text is lowercased and split into words on non-alphanumeric characters.
//! Each word is padded with two spaces in front and one behind before its
//! three-character windows are collected. The score is the size of the
//! intersection of both trigram sets over the size of their union.

use std::collections::BTreeSet;

/// Minimum similarity a title must exceed to match a text search.
///
/// The in-memory store compares the `f64` score strictly, so a score of
/// exactly `0.1` is excluded. PostgreSQL computes `similarity()` as `float4`,
/// where `0.1` rounds above the `float8` bound, so the database includes that
/// boundary value.
pub const SIMILARITY_THRESHOLD: f64 = 0.1;

/// Trigram set of `text`.
pub fn trigrams(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    let mut set = BTreeSet::new();

    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = format!("  {word} ").chars().collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }

    set
}

/// Similarity between two strings in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = trigrams(a);
    let b = trigrams(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let common = a.intersection(&b).count();
    let union = a.len() + b.len() - common;
    common as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigrams_pad_words() {
        let set = trigrams("Reed");
        let expected: BTreeSet<String> = ["  r", " re", "ree", "eed", "ed "]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_identical_strings_score_one() {
        assert_eq!(similarity("reed", "REED"), 1.0);
    }

    #[test]
    fn test_reed_titles_rank_above_threshold() {
        let care = similarity("Reed Care Basics", "reed");
        let intro = similarity("Intro to Reeds", "reed");
        let touring = similarity("Touring Schedule", "reed");

        assert!(care > intro, "{care} should beat {intro}");
        assert!(intro > SIMILARITY_THRESHOLD);
        assert!(touring <= SIMILARITY_THRESHOLD);
        assert!((intro - 0.25).abs() < 1e-9);
        assert!((care - 5.0 / 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_score_does_not_exceed_threshold() {
        // 1 shared trigram out of 10
        let score = similarity("acdefgh", "ab");
        assert_eq!(score, SIMILARITY_THRESHOLD);
        assert!(score <= SIMILARITY_THRESHOLD);
        assert!((score as f32) as f64 > SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        assert_eq!(similarity("", "reed"), 0.0);
        assert_eq!(similarity("!!", "reed"), 0.0);
    }
}
