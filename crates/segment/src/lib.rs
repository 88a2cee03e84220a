//! Block segmentation for topic descriptions.
//!
//! [`segment`] turns normalized text into a `Vec<Block>`: paragraphs, bullet
//! lists, and at most one trailing references block. It runs in four passes:
//!
//! 1. line merge: re-join layout-wrapped lines (hyphen wraps, label-only
//!    lines, sentence continuations)
//! 2. block scan: blank lines, bullets, prose, and reference lines such as
//!    `34 https://example.org/x`, which leave the prose
//! 3. inline tokenization: labels, URLs, `[n]` and `word34` markers become
//!    tokens, with indices from one footnote table shared across the
//!    document
//! 4. repair and finalization: the "expected outcomes:" lead-in repair, then
//!    the references block ordered by index
//!
//! Output depends only on the input string. Two runs over the same text give
//! the same blocks and the same reference indices.
//!
//! ```rust
//! use segment::{segment, Block, InlineToken};
//!
//! let blocks = segment("Scope:\nReduce emissions.\n• Item one\n• Item two");
//! assert_eq!(
//!     blocks[0],
//!     Block::Paragraph {
//!         tokens: vec![InlineToken::label("Scope:"), InlineToken::text("Reduce emissions.")],
//!     }
//! );
//! ```

mod blocks;
mod inline;
mod labels;
mod lines;
mod repair;
mod types;

use std::collections::HashMap;

use tracing::debug;

use crate::blocks::{scan, RawBlock, ReferenceLine};
use crate::inline::{tokenize_block, FootnoteTable};

pub use crate::inline::MAX_CODE_PREFIX_LETTERS;
pub use crate::types::{plain_text, Block, InlineToken, ReferenceEntry};

/// Segments normalized text into blocks. Empty input gives no blocks.
pub fn segment(text: &str) -> Vec<Block> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let lines = lines::merge_lines(text);
    let (raw_blocks, reference_lines) = scan(&lines);

    let mut url_ids: HashMap<String, String> = HashMap::new();
    for line in &reference_lines {
        url_ids
            .entry(line.url.clone())
            .or_insert_with(|| line.raw_id.clone());
    }

    let mut table = FootnoteTable::default();
    let mut blocks = Vec::with_capacity(raw_blocks.len() + 1);
    for raw in &raw_blocks {
        let block = match raw {
            RawBlock::Paragraph(text) => Block::Paragraph {
                tokens: tokenize_block(text, &mut table, &url_ids),
            },
            RawBlock::List(items) => Block::List {
                items: items
                    .iter()
                    .map(|item| tokenize_block(item, &mut table, &url_ids))
                    .collect(),
            },
        };
        blocks.push(block);
    }

    repair::restore_expected_outcomes(&mut blocks, text);

    // Reference lines nobody cited still belong in the table, after the cited ones.
    for line in &reference_lines {
        if !table.contains(&line.raw_id) {
            table.index_for(&line.raw_id);
        }
    }
    let references = table.entries().count();
    if !table.is_empty() {
        blocks.push(references_block(&table, &reference_lines));
    }

    debug!(
        lines = lines.len(),
        blocks = blocks.len(),
        references,
        "segment_complete"
    );
    blocks
}

fn references_block(table: &FootnoteTable, reference_lines: &[ReferenceLine]) -> Block {
    let by_id: HashMap<&str, &ReferenceLine> = reference_lines
        .iter()
        .map(|line| (line.raw_id.as_str(), line))
        .collect();

    let entries = table
        .entries()
        .map(|(index, raw_id)| {
            let line = by_id.get(raw_id);
            let url = line
                .map(|l| l.url.clone())
                .or_else(|| looks_like_url(raw_id).then(|| raw_id.to_string()));
            ReferenceEntry {
                index,
                raw_id: raw_id.to_string(),
                url,
                text: line.and_then(|l| l.text.clone()),
            }
        })
        .collect();

    Block::References { entries }
}

fn looks_like_url(raw_id: &str) -> bool {
    let lower = raw_id.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_indices(blocks: &[Block]) -> Vec<usize> {
        let mut seen = Vec::new();
        let mut visit = |tokens: &[InlineToken]| {
            for token in tokens {
                if let InlineToken::Reference { index, .. } = token {
                    seen.push(*index);
                }
            }
        };
        for block in blocks {
            match block {
                Block::Paragraph { tokens } => visit(tokens.as_slice()),
                Block::List { items } => items.iter().for_each(|item| visit(item.as_slice())),
                Block::References { .. } => {}
            }
        }
        seen
    }

    #[test]
    fn label_paragraph_then_list() {
        let blocks = segment("Scope:\nReduce emissions.\n• Item one\n• Item two");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph {
                    tokens: vec![InlineToken::label("Scope:"), InlineToken::text("Reduce emissions.")],
                },
                Block::List {
                    items: vec![
                        vec![InlineToken::text("Item one")],
                        vec![InlineToken::text("Item two")],
                    ],
                },
            ]
        );
    }

    #[test]
    fn attached_footnote_resolves_against_reference_line() {
        let blocks = segment("Projects will boost impact34 of climate policy.\n\n34 https://example.org/x");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph {
                    tokens: vec![
                        InlineToken::text("Projects will boost impact"),
                        InlineToken::reference(1, "34"),
                        InlineToken::text(" of climate policy."),
                    ],
                },
                Block::References {
                    entries: vec![ReferenceEntry {
                        index: 1,
                        raw_id: "34".into(),
                        url: Some("https://example.org/x".into()),
                        text: None,
                    }],
                },
            ]
        );
    }

    #[test]
    fn indices_are_dense_in_first_occurrence_order() {
        let text = "Alpha claim7 and beta[2].\n\n• gamma https://example.org/g\n• delta claim7\n\n[2] Report https://example.org/r\n5 https://example.org/uncited";
        let blocks = segment(text);
        assert_eq!(reference_indices(&blocks), vec![1, 2, 3, 1]);

        let Some(Block::References { entries }) = blocks.last() else {
            panic!("references block missing");
        };
        let listed: Vec<(usize, &str)> = entries
            .iter()
            .map(|e| (e.index, e.raw_id.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![(1, "7"), (2, "2"), (3, "https://example.org/g"), (4, "5")]
        );
        assert_eq!(entries[1].text.as_deref(), Some("Report"));
        assert_eq!(entries[2].url.as_deref(), Some("https://example.org/g"));
        assert_eq!(entries[0].url, None);
    }

    #[test]
    fn inline_url_shares_entry_with_reference_line() {
        let blocks = segment("Details at https://example.org/x.\n\n[4] Source https://example.org/x");
        let Some(Block::References { entries }) = blocks.last() else {
            panic!("references block missing");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].raw_id, "4");
        assert_eq!(entries[0].text.as_deref(), Some("Source"));
    }

    #[test]
    fn hyphen_wrap_rejoins_word() {
        let blocks = segment("sustainabil-\nity and resilience");
        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                tokens: vec![InlineToken::text("sustainability and resilience")],
            }]
        );
    }

    #[test]
    fn expected_outcomes_lead_in_is_repaired() {
        let text = "Expected Outcome: Project results are expected to contribute to some or all of the following\n\nexpected outcomes:\n\n• cleaner air\n• better data";
        let blocks = segment(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            plain_text(match &blocks[0] {
                Block::Paragraph { tokens } => tokens,
                other => panic!("unexpected block {other:?}"),
            }),
            "Expected Outcome: Project results are expected to contribute to some or all of the following expected outcomes:"
        );
    }

    #[test]
    fn segmentation_is_deterministic() {
        let text = "Scope: a1 b[9] c https://x.org\n- item22 here\n\n9 https://nine.org";
        assert_eq!(segment(text), segment(text));
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert!(segment("").is_empty());
        assert!(segment("\n \n").is_empty());
    }

    #[test]
    fn blocks_serialize_with_type_tag() {
        let blocks = segment("Scope: text");
        let json = serde_json::to_value(&blocks).expect("serialize blocks");
        assert_eq!(json[0]["type"], "paragraph");
        assert_eq!(json[0]["tokens"][0]["type"], "label");
        assert_eq!(json[0]["tokens"][0]["label"], "Scope:");
    }
}
