//! Line-merge pass.
//!
//! Extracted text wraps sentences at layout width. Before blocks are built,
//! adjacent non-blank lines are re-joined when one of three rules holds:
//!
//! - hyphen wrap: the line ends in `letter-` and the next starts with a
//!   letter. The hyphen is dropped and no space is inserted.
//! - label line: the line is a section label alone ("Scope:"). The next
//!   line is appended after one space, unless it is a bullet.
//! - continuation: the line has no terminal punctuation and the next starts
//!   with a lowercase letter or an opening quote or bracket. Lines starting
//!   with a URL never continue a sentence.
//!
//! Blank lines are kept (as empty strings) since they delimit blocks.

use crate::blocks::{is_bullet, is_reference_line};
use crate::labels::is_label_only;

const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?', ';', ':'];
const OPENING_CHARS: &[char] = &['"', '\u{201C}', '\u{2018}', '\'', '(', '[', '{'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    /// Drop the trailing hyphen, no separator.
    HyphenWrap,
    /// One space between the lines.
    Spaced,
}

pub(crate) fn merge_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut merged = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let mut current = lines[i].trim_end().to_string();
        i += 1;
        if current.trim().is_empty() {
            merged.push(String::new());
            continue;
        }

        while i < lines.len() {
            let next = lines[i].trim();
            if next.is_empty() {
                break;
            }
            match join_kind(&current, next) {
                Some(Join::HyphenWrap) => {
                    current.pop();
                    current.push_str(next);
                }
                Some(Join::Spaced) => {
                    current.push(' ');
                    current.push_str(next);
                }
                None => break,
            }
            i += 1;
        }

        merged.push(current);
    }

    merged
}

fn join_kind(current: &str, next: &str) -> Option<Join> {
    if ends_with_letter_hyphen(current) && starts_with_letter(next) {
        return Some(Join::HyphenWrap);
    }
    if is_label_only(current) {
        return (!is_bullet(next)).then_some(Join::Spaced);
    }
    if is_reference_line(current) || starts_with_url(next) {
        return None;
    }
    let open_sentence = !current.trim_end().ends_with(TERMINAL_PUNCTUATION);
    let continues = next
        .chars()
        .next()
        .is_some_and(|c| c.is_lowercase() || OPENING_CHARS.contains(&c));
    (open_sentence && continues).then_some(Join::Spaced)
}

fn ends_with_letter_hyphen(line: &str) -> bool {
    let mut rev = line.trim_end().chars().rev();
    matches!((rev.next(), rev.next()), (Some('-'), Some(c)) if c.is_alphabetic())
}

fn starts_with_letter(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_alphabetic)
}

fn starts_with_url(line: &str) -> bool {
    let lower = line.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphen_wrap_joins_without_space() {
        assert_eq!(
            merge_lines("sustainabil-\nity and resilience"),
            vec!["sustainability and resilience"]
        );
    }

    #[test]
    fn label_line_joins_next_line() {
        assert_eq!(
            merge_lines("Scope:\nReduce emissions.\n• Item one"),
            vec!["Scope: Reduce emissions.", "• Item one"]
        );
    }

    #[test]
    fn label_line_does_not_swallow_bullet() {
        assert_eq!(
            merge_lines("Expected Outcome:\n• first"),
            vec!["Expected Outcome:", "• first"]
        );
    }

    #[test]
    fn continuation_needs_open_sentence_and_lowercase() {
        assert_eq!(
            merge_lines("Projects should\naddress (a) the\n(b) scope.\nNext sentence"),
            vec!["Projects should address (a) the (b) scope.", "Next sentence"]
        );
        assert_eq!(merge_lines("Done.\nlower start"), vec!["Done.", "lower start"]);
    }

    #[test]
    fn blank_lines_stop_merging() {
        assert_eq!(
            merge_lines("open clause\n\ncontinued"),
            vec!["open clause", "", "continued"]
        );
    }

    #[test]
    fn url_lines_stay_separate() {
        assert_eq!(
            merge_lines("see the portal\nhttps://example.org/x"),
            vec!["see the portal", "https://example.org/x"]
        );
        assert_eq!(
            merge_lines("[1] https://example.org/x\nand more"),
            vec!["[1] https://example.org/x", "and more"]
        );
    }

    #[test]
    fn bullet_item_absorbs_wrapped_tail() {
        assert_eq!(
            merge_lines("• improved data\nsharing across borders"),
            vec!["• improved data sharing across borders"]
        );
    }
}
