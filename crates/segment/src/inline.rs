//! Inline tokenization and the per-document footnote table.
//!
//! Three pattern classes compete for each position of a prose run:
//!
//! - a URL (`https://…`, `http://…`, `www.…`)
//! - a bracketed number (`[12]`)
//! - one or two digits glued to a letter or `)` (`impact34`)
//!
//! The scanner keeps a cursor, looks for the next match of each class from
//! the cursor, and takes whichever starts first. Everything before it is a
//! text run; the match itself becomes a [`InlineToken::Reference`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::labels::split_leading_label;
use crate::types::InlineToken;

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:https?://|www\.)[^\s<>"]+"#).expect("url pattern compiles"));

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,3})\]").expect("bracketed reference pattern compiles"));

static ATTACHED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L})](\d{1,2})").expect("attached reference pattern compiles"));

/// Uppercase words up to this many letters followed by digits are read as
/// formulas or codes (CO2, NO2, PM10, H2), not as footnote markers.
pub const MAX_CODE_PREFIX_LETTERS: usize = 4;

const URL_TRAILING: &[char] = &['.', ',', ';', ':', ')', ']', '}', '\'', '"'];

pub(crate) fn trim_url(url: &str) -> &str {
    url.trim_end_matches(URL_TRAILING)
}

/// Maps raw identifiers to dense 1-based indices in first-occurrence order.
///
/// One table lives for exactly one segmentation pass and is threaded through
/// every tokenization call of that pass.
#[derive(Debug, Default)]
pub(crate) struct FootnoteTable {
    order: Vec<String>,
    indices: HashMap<String, usize>,
}

impl FootnoteTable {
    pub(crate) fn index_for(&mut self, raw_id: &str) -> usize {
        if let Some(&index) = self.indices.get(raw_id) {
            return index;
        }
        self.order.push(raw_id.to_string());
        let index = self.order.len();
        self.indices.insert(raw_id.to_string(), index);
        index
    }

    pub(crate) fn contains(&self, raw_id: &str) -> bool {
        self.indices.contains_key(raw_id)
    }

    /// Raw identifiers paired with their index, in index order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.order
            .iter()
            .enumerate()
            .map(|(i, raw)| (i + 1, raw.as_str()))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Tokenizes one block's text, splitting off a leading section label first.
///
/// `url_ids` maps URLs seen on reference lines to that line's raw identifier,
/// so an inline URL and its reference line share one entry.
pub(crate) fn tokenize_block(
    text: &str,
    table: &mut FootnoteTable,
    url_ids: &HashMap<String, String>,
) -> Vec<InlineToken> {
    match split_leading_label(text) {
        Some((label, rest)) => {
            let mut tokens = vec![InlineToken::label(label)];
            tokens.extend(tokenize(rest, table, url_ids));
            tokens
        }
        None => tokenize(text, table, url_ids),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    start: usize,
    end: usize,
    raw_id: String,
}

pub(crate) fn tokenize(
    text: &str,
    table: &mut FootnoteTable,
    url_ids: &HashMap<String, String>,
) -> Vec<InlineToken> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        let Some(found) = next_candidate(text, cursor, url_ids) else {
            break;
        };
        push_text(&mut tokens, &text[cursor..found.start]);
        let index = table.index_for(&found.raw_id);
        tokens.push(InlineToken::reference(index, found.raw_id));
        cursor = found.end;
    }
    if cursor < text.len() {
        push_text(&mut tokens, &text[cursor..]);
    }

    if let Some(InlineToken::Text { text }) = tokens.last_mut() {
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
        if text.is_empty() {
            tokens.pop();
        }
    }
    tokens
}

fn push_text(tokens: &mut Vec<InlineToken>, run: &str) {
    if !run.is_empty() {
        tokens.push(InlineToken::text(run));
    }
}

fn next_candidate(
    text: &str,
    cursor: usize,
    url_ids: &HashMap<String, String>,
) -> Option<Candidate> {
    [
        next_url(text, cursor, url_ids),
        next_bracketed(text, cursor),
        next_attached(text, cursor),
    ]
    .into_iter()
    .flatten()
    .min_by_key(|c| c.start)
}

fn next_url(text: &str, cursor: usize, url_ids: &HashMap<String, String>) -> Option<Candidate> {
    let found = URL.find_at(text, cursor)?;
    let url = trim_url(found.as_str());
    let raw_id = url_ids.get(url).cloned().unwrap_or_else(|| url.to_string());
    Some(Candidate {
        start: found.start(),
        end: found.start() + url.len(),
        raw_id,
    })
}

fn next_bracketed(text: &str, cursor: usize) -> Option<Candidate> {
    let caps = BRACKETED.captures_at(text, cursor)?;
    let whole = caps.get(0)?;
    Some(Candidate {
        start: whole.start(),
        end: whole.end(),
        raw_id: caps[1].to_string(),
    })
}

fn next_attached(text: &str, cursor: usize) -> Option<Candidate> {
    let mut search = cursor;
    while let Some(caps) = ATTACHED.captures_at(text, search) {
        let digits = caps.get(1)?;
        if is_attached_marker(text, digits.start(), digits.end()) {
            return Some(Candidate {
                start: digits.start(),
                end: digits.end(),
                raw_id: digits.as_str().to_string(),
            });
        }
        search = digits.end();
    }
    None
}

fn is_attached_marker(text: &str, start: usize, end: usize) -> bool {
    let mut after = text[end..].chars();
    match after.next() {
        Some(c) if c.is_alphanumeric() => return false,
        // "version2.0", "scale1,5"
        Some('.' | ',') if after.next().is_some_and(|c| c.is_ascii_digit()) => return false,
        _ => {}
    }

    let word: Vec<char> = text[..start]
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic())
        .collect();
    let is_code = !word.is_empty()
        && word.len() <= MAX_CODE_PREFIX_LETTERS
        && word.iter().all(|c| c.is_uppercase());
    !is_code
}
