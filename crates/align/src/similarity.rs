//! Word-set similarity used to pair items.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word token pattern compiles"));

/// Function words ignored when comparing wording. Negations and modal verbs
/// change what a requirement says and are never on this list.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "between", "both", "but", "by", "each", "for", "from", "has", "have", "if", "in",
    "into", "is", "it", "its", "more", "most", "of", "on", "or", "other", "over", "per", "so",
    "such", "than", "that", "the", "their", "these", "this", "those", "through", "to", "under",
    "via", "was", "were", "which", "with", "within",
];

fn tokens(text: &str) -> HashSet<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

fn content_tokens(all: &HashSet<String>) -> HashSet<&str> {
    all.iter()
        .map(String::as_str)
        .filter(|t| !STOP_WORDS.contains(t))
        .collect()
}

/// Jaccard similarity over lowercased word and number tokens.
///
/// Function words are ignored unless ignoring them would leave either side
/// empty, in which case all tokens count. Two texts without any tokens score
/// 1.0; exactly one empty side scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let all_a = tokens(a);
    let all_b = tokens(b);
    match (all_a.is_empty(), all_b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let content_a = content_tokens(&all_a);
    let content_b = content_tokens(&all_b);
    if content_a.is_empty() || content_b.is_empty() {
        let full_a: HashSet<&str> = all_a.iter().map(String::as_str).collect();
        let full_b: HashSet<&str> = all_b.iter().map(String::as_str).collect();
        return jaccard(&full_a, &full_b);
    }
    jaccard(&content_a, &content_b)
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Rounds to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_and_empty_cases() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("x", ""), 0.0);
        assert_eq!(similarity("", "x"), 0.0);
        assert_eq!(similarity("!!", "--"), 1.0);
        assert_eq!(similarity("Reduce emissions", "reduce EMISSIONS"), 1.0);
    }

    #[test]
    fn identical_text_scores_one() {
        for text in ["the", "of the and", "Reduce emissions by 2030.", "x"] {
            assert_eq!(similarity(text, text), 1.0, "{text:?}");
        }
    }

    #[test]
    fn function_words_are_ignored() {
        assert_eq!(
            similarity("Reduce emissions by 2030.", "Reduce emissions before 2030."),
            1.0
        );
    }

    #[test]
    fn negations_and_modals_count() {
        // {applicants, must, smes} vs {applicants, must, not, smes}
        assert_eq!(similarity("Applicants must be SMEs.", "Applicants must not be SMEs."), 0.75);
        assert!(similarity("Partners should apply.", "Partners may apply.") < 1.0);
    }

    #[test]
    fn partial_overlap() {
        // {climate, neutral, cities} vs {climate, neutral, regions}
        let s = similarity("climate neutral cities", "climate neutral regions");
        assert!((s - 0.5).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn falls_back_to_all_tokens() {
        // Only function words on one side.
        assert_eq!(similarity("of the", "the"), 0.5);
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(0.777), 0.78);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }
}
