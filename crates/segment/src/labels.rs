//! Section keywords that open a block ("Scope:", "Expected Outcome:").

use once_cell::sync::Lazy;
use regex::Regex;

// Alternatives are tried left to right, so longer labels come first.
static LEADING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(expected outcomes?|expected impacts?|specific challenge|type of action|objectives?|eligibility|applicants|activities|budget|scope)\s*:",
    )
    .expect("section label pattern compiles")
});

/// Splits a leading section label off `text`.
///
/// Returns the label as written (trimmed, colon kept) and the remainder with
/// its leading whitespace removed.
pub(crate) fn split_leading_label(text: &str) -> Option<(&str, &str)> {
    let found = LEADING_LABEL.find(text)?;
    let label = text[..found.end()].trim_start();
    let rest = text[found.end()..].trim_start();
    Some((label, rest))
}

/// True when the line holds a section label and nothing else.
pub(crate) fn is_label_only(line: &str) -> bool {
    matches!(split_leading_label(line), Some((_, rest)) if rest.is_empty())
}
