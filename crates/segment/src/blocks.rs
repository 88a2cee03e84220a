//! Block construction pass over merged lines.
//!
//! Produces raw paragraph and list text plus the reference lines pulled out
//! of the prose. Tokenization happens afterwards, in document order, so
//! that footnote indices follow reading order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::inline::trim_url;

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[•\-\x{2013}]\s+(.*)$").expect("bullet pattern compiles"));

static INDEXED_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[?(\d{1,3})\]?[.)]?\s+(?:(.*?)\s+)?(https?://\S+)\s*$")
        .expect("indexed reference pattern compiles")
});

static BARE_URL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(https?://\S+|www\.\S+)\s*$").expect("bare url pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawBlock {
    Paragraph(String),
    List(Vec<String>),
}

/// A line that cites a source rather than carrying prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReferenceLine {
    pub raw_id: String,
    pub url: String,
    pub text: Option<String>,
}

pub(crate) fn is_bullet(line: &str) -> bool {
    BULLET.is_match(line)
}

pub(crate) fn is_reference_line(line: &str) -> bool {
    parse_reference_line(line).is_some()
}

pub(crate) fn parse_reference_line(line: &str) -> Option<ReferenceLine> {
    if let Some(caps) = INDEXED_REFERENCE.captures(line) {
        let text = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        return Some(ReferenceLine {
            raw_id: caps[1].to_string(),
            url: trim_url(&caps[3]).to_string(),
            text,
        });
    }
    BARE_URL_LINE.captures(line).map(|caps| {
        let url = trim_url(&caps[1]).to_string();
        ReferenceLine {
            raw_id: url.clone(),
            url,
            text: None,
        }
    })
}

#[derive(Default)]
struct Scanner {
    blocks: Vec<RawBlock>,
    references: Vec<ReferenceLine>,
    paragraph: Vec<String>,
    items: Vec<String>,
}

impl Scanner {
    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = normalize::collapse_whitespace(&self.paragraph.join(" "));
        self.paragraph.clear();
        if !text.is_empty() {
            self.blocks.push(RawBlock::Paragraph(text));
        }
    }

    fn flush_list(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let items = std::mem::take(&mut self.items);
        self.blocks.push(RawBlock::List(items));
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn record_reference(&mut self, reference: ReferenceLine) {
        if self.references.iter().all(|r| r.raw_id != reference.raw_id) {
            self.references.push(reference);
        }
    }
}

/// Splits merged lines into raw blocks and reference lines.
pub(crate) fn scan(lines: &[String]) -> (Vec<RawBlock>, Vec<ReferenceLine>) {
    let mut scanner = Scanner::default();

    for line in lines {
        if let Some(reference) = parse_reference_line(line) {
            scanner.flush();
            scanner.record_reference(reference);
            continue;
        }
        if line.trim().is_empty() {
            scanner.flush();
            continue;
        }
        if let Some(caps) = BULLET.captures(line) {
            scanner.flush_paragraph();
            let item = normalize::collapse_whitespace(&caps[1]);
            if !item.is_empty() {
                scanner.items.push(item);
            }
            continue;
        }
        scanner.flush_list();
        scanner.paragraph.push(line.trim().to_string());
    }
    scanner.flush();

    (scanner.blocks, scanner.references)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_string).collect()
    }

    #[test]
    fn paragraphs_and_lists() {
        let (blocks, refs) = scan(&lines("Intro line\nsecond  line\n• one\n- two\n\u{2013} three\nAfter"));
        assert!(refs.is_empty());
        assert_eq!(
            blocks,
            vec![
                RawBlock::Paragraph("Intro line second line".into()),
                RawBlock::List(vec!["one".into(), "two".into(), "three".into()]),
                RawBlock::Paragraph("After".into()),
            ]
        );
    }

    #[test]
    fn blank_line_splits_lists() {
        let (blocks, _) = scan(&lines("• a\n\n• b"));
        assert_eq!(
            blocks,
            vec![RawBlock::List(vec!["a".into()]), RawBlock::List(vec!["b".into()])]
        );
    }

    #[test]
    fn reference_lines_leave_the_prose() {
        let (blocks, refs) = scan(&lines(
            "Body text\n34 https://example.org/x\n[2] Annual report https://example.org/y.\nhttps://example.org/z",
        ));
        assert_eq!(blocks, vec![RawBlock::Paragraph("Body text".into())]);
        assert_eq!(
            refs,
            vec![
                ReferenceLine {
                    raw_id: "34".into(),
                    url: "https://example.org/x".into(),
                    text: None,
                },
                ReferenceLine {
                    raw_id: "2".into(),
                    url: "https://example.org/y".into(),
                    text: Some("Annual report".into()),
                },
                ReferenceLine {
                    raw_id: "https://example.org/z".into(),
                    url: "https://example.org/z".into(),
                    text: None,
                },
            ]
        );
    }

    #[test]
    fn hyphen_without_space_is_not_a_bullet() {
        assert!(!is_bullet("-5 degrees"));
        assert!(is_bullet("  \u{2022} item"));
    }
}
