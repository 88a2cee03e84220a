use std::collections::HashSet;

use segment::{plain_text, segment, Block};
use tracing::debug;

use crate::error::AlignError;
use crate::labels::labels_present;
use crate::similarity::{round2, similarity};
use crate::types::{
    AlignConfig, AlignmentResult, DiffItem, DiffPair, ItemKind, NotableDifference, NotableKind,
};


/// Aligns two topic descriptions with a validated [`AlignConfig`].
#[derive(Debug, Clone)]
pub struct Aligner {
    config: AlignConfig,
}

impl Default for Aligner {
    fn default() -> Self {
        Self {
            config: AlignConfig::default(),
        }
    }
}

impl Aligner {
    pub fn new(config: AlignConfig) -> Result<Self, AlignError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Segments both texts and aligns the resulting blocks.
    pub fn diff(&self, source: &str, other: &str) -> AlignmentResult {
        self.diff_blocks(&segment(source), &segment(other))
    }

    /// Greedy, source-ordered alignment of two block sequences.
    ///
    /// Each source item takes the best unclaimed other item of the same kind
    /// (earliest wins a tie). The pair is accepted when its similarity,
    /// rounded to two decimals, reaches `match_threshold`.
    pub fn diff_blocks(&self, source: &[Block], other: &[Block]) -> AlignmentResult {
        let source_items = flatten_items(source);
        let other_items = flatten_items(other);

        let mut claimed = vec![false; other_items.len()];
        let mut pairs = Vec::new();
        let mut missing_in_other = Vec::new();

        for item in &source_items {
            let mut best: Option<(usize, f64)> = None;
            for (idx, candidate) in other_items.iter().enumerate() {
                if claimed[idx] || candidate.kind != item.kind {
                    continue;
                }
                let score = similarity(&item.text, &candidate.text);
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((idx, score));
                }
            }

            match best.map(|(idx, score)| (idx, round2(score))) {
                Some((idx, rounded)) if rounded >= self.config.match_threshold => {
                    claimed[idx] = true;
                    pairs.push(DiffPair {
                        kind: item.kind,
                        source_text: item.text.clone(),
                        other_text: other_items[idx].text.clone(),
                        similarity: rounded,
                    });
                }
                _ => missing_in_other.push(item.clone()),
            }
        }

        let missing_in_source: Vec<DiffItem> = other_items
            .iter()
            .zip(&claimed)
            .filter(|(_, taken)| !**taken)
            .map(|(item, _)| item.clone())
            .collect();

        let source_labels = labels_present(source_items.iter().map(|i| i.text.as_str()));
        let other_labels = labels_present(other_items.iter().map(|i| i.text.as_str()));
        let labels_only_in_source = one_sided(&source_labels, &other_labels);
        let labels_only_in_other = one_sided(&other_labels, &source_labels);

        let score = self.score(
            &source_items,
            &pairs,
            labels_only_in_source.len() + labels_only_in_other.len(),
            missing_in_other.len() + missing_in_source.len(),
        );
        let notable = self.notable(&pairs, &missing_in_other, &missing_in_source);

        debug!(
            source_items = source_items.len(),
            other_items = other_items.len(),
            pairs = pairs.len(),
            missing_in_other = missing_in_other.len(),
            missing_in_source = missing_in_source.len(),
            score,
            "alignment_complete"
        );

        AlignmentResult {
            pairs,
            missing_in_other,
            missing_in_source,
            source_labels,
            other_labels,
            labels_only_in_source,
            labels_only_in_other,
            notable,
            score,
        }
    }

    fn score(
        &self,
        source_items: &[DiffItem],
        pairs: &[DiffPair],
        one_sided_labels: usize,
        unmatched: usize,
    ) -> u32 {
        let rate = |kind: ItemKind| {
            let total = source_items.iter().filter(|i| i.kind == kind).count();
            if total == 0 {
                return 1.0;
            }
            let matched = pairs.iter().filter(|p| p.kind == kind).count();
            matched as f64 / total as f64
        };

        let raw = 50.0 * rate(ItemKind::Paragraph) + 50.0 * rate(ItemKind::Bullet)
            - self.config.label_penalty * one_sided_labels as f64
            - self.config.unmatched_penalty * unmatched as f64;
        raw.clamp(0.0, 100.0).round() as u32
    }

    fn notable(
        &self,
        pairs: &[DiffPair],
        missing_in_other: &[DiffItem],
        missing_in_source: &[DiffItem],
    ) -> Vec<NotableDifference> {
        let reworded = pairs
            .iter()
            .filter(|p| p.similarity < self.config.notable_similarity)
            .map(|p| NotableDifference {
                kind: NotableKind::Reworded,
                item_kind: p.kind,
                snippet: snippet(&p.source_text, self.config.snippet_chars),
                similarity: Some(p.similarity),
            });
        let only_source = missing_in_other.iter().map(|i| NotableDifference {
            kind: NotableKind::MissingInOther,
            item_kind: i.kind,
            snippet: snippet(&i.text, self.config.snippet_chars),
            similarity: None,
        });
        let only_other = missing_in_source.iter().map(|i| NotableDifference {
            kind: NotableKind::MissingInSource,
            item_kind: i.kind,
            snippet: snippet(&i.text, self.config.snippet_chars),
            similarity: None,
        });

        reworded
            .chain(only_source)
            .chain(only_other)
            .take(self.config.max_notable)
            .collect()
    }
}

/// Turns blocks into comparable items: one per paragraph, one per list
/// entry. References blocks contribute nothing.
pub fn flatten_items(blocks: &[Block]) -> Vec<DiffItem> {
    let mut items = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph { tokens } => push_item(&mut items, ItemKind::Paragraph, plain_text(tokens)),
            Block::List { items: entries } => {
                for entry in entries {
                    push_item(&mut items, ItemKind::Bullet, plain_text(entry));
                }
            }
            Block::References { .. } => {}
        }
    }
    items
}

fn push_item(items: &mut Vec<DiffItem>, kind: ItemKind, text: String) {
    if !text.is_empty() {
        items.push(DiffItem { kind, text });
    }
}

fn one_sided(side: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    side.iter()
        .filter(|label| !other.contains(label.as_str()))
        .cloned()
        .collect()
}

/// Truncates to `max_chars` characters, the last one being `…`.
pub(crate) fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}
