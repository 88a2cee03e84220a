//! Narrow post-pass for the "to some or all of the following expected
//! outcomes:" lead-in, whose tail can end up split off or lost when it sits
//! on its own line ahead of a bullet list.

use crate::types::{plain_text, Block, InlineToken};

const LEAD_IN: &str = "to some or all of the following";
const TAIL: &str = "expected outcomes:";

/// Re-attaches "expected outcomes:" to a lead-in paragraph that lost it.
///
/// Only fires when the paragraph is exactly `[label, text ending in the
/// lead-in]`, a list follows it, and the source text really continues with
/// "expected outcomes:" after that same lead-in. Lead-in occurrences in the
/// blocks and in the source are paired up in order. A standalone
/// "expected outcomes:" label paragraph between the lead-in and the list is
/// folded in.
pub(crate) fn restore_expected_outcomes(blocks: &mut Vec<Block>, source: &str) {
    let evidence = tail_evidence(source);
    if !evidence.contains(&true) {
        return;
    }

    let mut seen = 0;
    let mut i = 0;
    while i < blocks.len() {
        let occurrences = lead_in_count(&blocks[i]);
        seen += occurrences;
        if occurrences > 0 && i + 1 < blocks.len() && is_lead_in(&blocks[i]) {
            let has_tail = evidence.get(seen - 1).copied().unwrap_or(false);
            let split_tail = is_standalone_tail(&blocks[i + 1])
                && matches!(blocks.get(i + 2), Some(Block::List { .. }));
            if has_tail && split_tail {
                blocks.remove(i + 1);
                append_tail(&mut blocks[i]);
            } else if has_tail && matches!(blocks[i + 1], Block::List { .. }) {
                append_tail(&mut blocks[i]);
            }
        }
        i += 1;
    }
}

/// For each lead-in in the source, in order, whether the tail follows it.
fn tail_evidence(source: &str) -> Vec<bool> {
    let lower = normalize::collapse_whitespace(&source.to_lowercase());
    lower
        .match_indices(LEAD_IN)
        .map(|(at, _)| lower[at + LEAD_IN.len()..].trim_start().starts_with(TAIL))
        .collect()
}

fn lead_in_count(block: &Block) -> usize {
    let count = |tokens: &[InlineToken]| {
        normalize::collapse_whitespace(&plain_text(tokens).to_lowercase())
            .matches(LEAD_IN)
            .count()
    };
    match block {
        Block::Paragraph { tokens } => count(tokens.as_slice()),
        Block::List { items } => items.iter().map(|item| count(item.as_slice())).sum(),
        Block::References { .. } => 0,
    }
}

fn is_lead_in(block: &Block) -> bool {
    match block {
        Block::Paragraph { tokens } => match tokens.as_slice() {
            [InlineToken::Label { .. }, InlineToken::Text { text }] => {
                text.trim_end().to_lowercase().ends_with(LEAD_IN)
            }
            _ => false,
        },
        _ => false,
    }
}

fn is_standalone_tail(block: &Block) -> bool {
    match block {
        Block::Paragraph { tokens } => match tokens.as_slice() {
            [InlineToken::Label { label }] => {
                let folded = normalize::collapse_whitespace(&label.to_lowercase()).replace(" :", ":");
                folded == TAIL
            }
            _ => false,
        },
        _ => false,
    }
}

fn append_tail(block: &mut Block) {
    if let Block::Paragraph { tokens } = block {
        if let Some(InlineToken::Text { text }) = tokens.last_mut() {
            let head = text.trim_end().to_string();
            *text = format!("{head} {TAIL}");
        }
    }
}
