//! Title cleanup for work-programme headings.
//!
//! Titles lifted from a PDF table of contents arrive with dot leaders, page
//! numbers, and short fragments split off by a line break ("mo dels").

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::whitespace::collapse_whitespace;

static DOT_LEADER_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}\s*\d*\s*$").expect("dot leader pattern compiles"));

static DOT_LEADER_PAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s\.{3,}\s*(\d{1,4})\s*$").expect("dot leader page pattern compiles")
});

static SHORT_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]{1,3})\s+([a-z]{3,})\b").expect("short fragment pattern compiles")
});

const TITLE_STOP_WORDS: &[&str] = &[
    "of", "in", "on", "to", "by", "an", "or", "if", "at", "be", "is", "it", "we", "il", "la", "le",
    "un", "una",
];

/// Strips a trailing `..... 42` table-of-contents leader.
///
/// Returns the text before the leader and the page number, or the input
/// unchanged and `None` when there is no leader.
pub fn strip_dot_leader(text: &str) -> (String, Option<u32>) {
    match DOT_LEADER_PAGE.captures(text) {
        Some(caps) => {
            let page = caps[1].parse().ok();
            let start = caps.get(0).map_or(text.len(), |m| m.start());
            (text[..start].trim_end().to_string(), page)
        }
        None => (text.to_string(), None),
    }
}

/// Produces a display title: single-spaced, no leader, no stray edge
/// punctuation, short split fragments rejoined.
pub fn clean_title(text: &str) -> String {
    let collapsed = collapse_whitespace(&text.replace('\u{00AD}', ""));
    if collapsed.is_empty() {
        return String::new();
    }
    let without_leader = DOT_LEADER_TAIL.replace(&collapsed, "");
    let trimmed = without_leader.trim_matches(|c| matches!(c, ' ' | '.' | '-' | '\u{2013}'));
    repair_broken_words(trimmed)
}

/// Rejoins a one- or two-letter lowercase fragment with the lowercase word
/// after it ("mo dels" becomes "models"), unless the fragment is itself a
/// common short word.
pub fn repair_broken_words(text: &str) -> String {
    SHORT_FRAGMENT
        .replace_all(text, |caps: &Captures<'_>| {
            let first = &caps[1];
            let second = &caps[2];
            let lowercase_fragment = first.len() <= 2 && first.chars().all(|c| c.is_ascii_lowercase());
            if lowercase_fragment && !TITLE_STOP_WORDS.contains(&first) {
                format!("{first}{second}")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
