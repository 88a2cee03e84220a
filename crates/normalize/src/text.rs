//! Light cleanup for text that did not come out of a PDF.
//!
//! Portal HTML and pasted descriptions have a different failure mode than
//! PDF extraction: odd hyphen code points, `\r\n` line endings, and hyphens
//! padded with spaces ("climate - neutral"). [`normalize_text`] fixes those
//! while leaving the line structure alone, since the segmenter needs it.

use once_cell::sync::Lazy;
use regex::Regex;

/// A hyphen between two letters with horizontal padding on either side.
static SPACED_HYPHEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\p{L})[ \t]*-[ \t]*(\p{L})").expect("spaced hyphen pattern compiles")
});

/// Normalizes line endings, invisible characters, and hyphenation.
///
/// - `\r\n` and `\r` become `\n`
/// - soft hyphens, U+FFFD and zero-width marks are removed, NBSP becomes a space
/// - U+2010, U+2011, U+2012, U+2212, U+FE63 and U+FF0D become `-`
///   (en and em dashes are left alone)
/// - trailing whitespace is trimmed from every line
/// - `letter - letter` collapses to `letter-letter`, never across a newline
///
/// Idempotent, and never fails.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut cleaned = String::with_capacity(unified.len());
    for ch in unified.chars() {
        match ch {
            '\u{00AD}' | '\u{FFFD}' | '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            '\u{00A0}' => cleaned.push(' '),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2212}' | '\u{FE63}' | '\u{FF0D}' => {
                cleaned.push('-')
            }
            _ => cleaned.push(ch),
        }
    }

    let trimmed = cleaned
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    collapse_spaced_hyphens(trimmed)
}

fn collapse_spaced_hyphens(text: String) -> String {
    // "a - b - c" needs a second pass because matches cannot overlap.
    let mut current = text;
    loop {
        let next = SPACED_HYPHEN.replace_all(&current, "${1}-${2}").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
