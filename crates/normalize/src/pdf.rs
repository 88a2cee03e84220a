//! PDF-extraction repair.
//!
//! Text pulled out of work-programme PDFs carries invisible code points,
//! hyphenated line wraps, and words that the layout engine split with a
//! space ("Stakehold ers"). [`normalize_pdf_text`] repairs all of these and
//! returns one clean line (or one clean line per input line when
//! [`PdfNormalizeConfig::preserve_newlines`] is set).
//!
//! The function is pure and idempotent: running it on its own output changes
//! nothing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::config::PdfNormalizeConfig;
use crate::whitespace::{collapse_line_whitespace, collapse_whitespace};

static HYPHEN_LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z0-9])[\-\x{2010}\x{2011}\x{2012}\x{2013}\x{2014}]\s*\n\s*([A-Za-z0-9])")
        .expect("hyphen line-break pattern compiles")
});

static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n+\s*").expect("newline-run pattern compiles"));

static TRIPLE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([A-Za-z]{4,})\s+(and|or)\s+([A-Za-z]{2,6})\b")
        .expect("triple fragment pattern compiles")
});

static PAIR_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]{3,})\s+([A-Za-z]{2,6})\b").expect("pair fragment pattern compiles")
});

static KNOWN_FIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bresp\s*on\s*ses\b", "responses"),
        (r"(?i)\bresp\s*on\s*ders\b", "responders"),
        (r"(?i)\benvir\s*on\s*ments\b", "environments"),
        (r"(?i)\bpers\s*on\s*alised\b", "personalised"),
        (r"(?i)\bpers\s*on\s*alized\b", "personalized"),
    ]
    .into_iter()
    .map(|(pattern, word)| (Regex::new(pattern).expect("known fix pattern compiles"), word))
    .collect()
});

/// Derivational endings that a layout engine commonly splits off a word.
const SUFFIXES: &[&str] = &[
    "ing", "tion", "sion", "ment", "ments", "ness", "ity", "able", "ible", "al", "ic", "ive", "ous",
    "ants", "ant", "ers", "er", "ed", "ly", "ways", "way", "ism", "ist", "ation", "ations", "ions",
    "ent", "ents",
];

/// Function words that are never the first half of a pair merge.
const PAIR_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "this", "that", "these", "those", "its", "their", "our",
    "your", "any", "all", "each", "every", "some", "many", "more", "most", "other", "such", "new",
    "one", "two", "three", "few", "same", "which", "what", "who", "how", "why", "where", "when",
    "was", "were", "are", "has", "had", "have", "can", "may", "will", "not", "but", "nor", "per",
    "via", "into", "onto", "than", "then", "also", "only", "both", "very", "own", "her", "his",
    "she", "they", "them",
];

/// Repairs extraction artifacts in PDF-derived text.
///
/// Steps, in order:
///
/// 1. drop soft hyphens, replacement and non-characters, zero-width marks and
///    private-use code points; map NBSP to a space; optionally fold ligatures
/// 2. unify `\r\n` and `\r` to `\n`
/// 3. rejoin hyphenated line wraps, keeping the hyphen (`climate-\nneutral`
///    becomes `climate-neutral`)
/// 4. turn remaining newline runs into single spaces
/// 5. rejoin words split before a known suffix
/// 6. apply the known fixes for fragmentations the heuristic cannot see
/// 7. collapse whitespace and trim
///
/// Steps 5 to 7 repeat until the text stops changing.
pub fn normalize_pdf_text(text: &str, config: &PdfNormalizeConfig) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = strip_invisible(text, config.fold_ligatures);
    let unified = cleaned.replace("\r\n", "\n").replace('\r', "\n");
    let rejoined = HYPHEN_LINE_BREAK
        .replace_all(&unified, "${1}-${2}")
        .into_owned();

    if config.preserve_newlines {
        let lines: Vec<String> = rejoined
            .split('\n')
            .map(|line| repair_to_fixed_point(line.trim()))
            .collect();
        return collapse_line_whitespace(lines.join("\n").trim());
    }

    let flattened = NEWLINE_RUN.replace_all(&rejoined, " ");
    let out = repair_to_fixed_point(&flattened);
    debug!(input_len = text.len(), output_len = out.len(), "pdf_text_normalized");
    out
}

fn repair_to_fixed_point(text: &str) -> String {
    let mut current = collapse_whitespace(text);
    loop {
        let merged = collapse_broken_word_fragments(&current);
        let next = collapse_whitespace(&apply_known_fixes(&merged));
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_invisible(text: &str, fold_ligatures: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00AD}' | '\u{FFFD}' | '\u{FFFE}' | '\u{FFFF}' => {}
            '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            '\u{E000}'..='\u{F8FF}' => {}
            '\u{00A0}' => out.push(' '),
            '\u{FB00}'..='\u{FB06}' if fold_ligatures => out.extend(std::iter::once(ch).nfkc()),
            _ => out.push(ch),
        }
    }
    out
}

/// Rejoins words split ahead of a recognized suffix.
///
/// Runs the `WORD and|or SUFFIX` pass first, then the `WORD SUFFIX` pass.
/// A rejected candidate does not consume its second word, so that word can
/// still start the next candidate.
pub(crate) fn collapse_broken_word_fragments(text: &str) -> String {
    let text = rewrite_candidates(text, &TRIPLE_FRAGMENT, merge_triplet);
    rewrite_candidates(&text, &PAIR_FRAGMENT, merge_pair)
}

fn rewrite_candidates(
    text: &str,
    pattern: &Regex,
    merge: fn(&Captures<'_>) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut search = 0;

    while search < text.len() {
        let Some(caps) = pattern.captures_at(text, search) else {
            break;
        };
        let (Some(whole), Some(second)) = (caps.get(0), caps.get(2)) else {
            break;
        };
        match merge(&caps) {
            Some(merged) => {
                out.push_str(&text[copied..whole.start()]);
                out.push_str(&merged);
                copied = whole.end();
                search = whole.end();
            }
            None => search = second.start(),
        }
    }

    out.push_str(&text[copied..]);
    out
}

fn merge_triplet(caps: &Captures<'_>) -> Option<String> {
    let first = &caps[1];
    let middle = &caps[2];
    let last = &caps[3];
    if first.len() < 5 || !is_suffix(last) {
        return None;
    }
    let mut tail = format!("{middle}{last}");
    if is_title_case(first) {
        tail = tail.to_lowercase();
    }
    Some(format!("{first}{tail}"))
}

fn merge_pair(caps: &Captures<'_>) -> Option<String> {
    let first = &caps[1];
    let second = &caps[2];
    if !is_suffix(second) || first.len() < 3 || is_pair_stop_word(first) {
        return None;
    }
    Some(merge_case(first, second))
}

fn merge_case(first: &str, second: &str) -> String {
    if is_title_case(first) && is_title_case(second) {
        format!("{first}{}", second.to_lowercase())
    } else {
        format!("{first}{second}")
    }
}

fn is_suffix(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    SUFFIXES.contains(&lower.as_str())
}

fn is_pair_stop_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    PAIR_STOP_WORDS.contains(&lower.as_str())
}

/// First letter upper case, at least one more letter, all of them lower case.
pub(crate) fn is_title_case(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest = chars.as_str();
            !rest.is_empty() && rest.chars().all(char::is_lowercase)
        }
        _ => false,
    }
}

fn apply_known_fixes(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, word) in KNOWN_FIXES.iter() {
        if !pattern.is_match(&out) {
            continue;
        }
        out = pattern
            .replace_all(&out, |caps: &Captures<'_>| {
                let starts_upper = caps[0].chars().next().is_some_and(char::is_uppercase);
                if starts_upper {
                    capitalize(word)
                } else {
                    (*word).to_string()
                }
            })
            .into_owned();
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
