use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

/// Which kind of block an item came from. Pairs never mix kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Paragraph,
    Bullet,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Paragraph => f.write_str("paragraph"),
            ItemKind::Bullet => f.write_str("bullet"),
        }
    }
}

/// One comparable unit: a paragraph, or a single list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffItem {
    pub kind: ItemKind,
    /// Plain text, label included, reference markers dropped.
    pub text: String,
}

/// A matched source/other item pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffPair {
    pub kind: ItemKind,
    pub source_text: String,
    pub other_text: String,
    /// Jaccard similarity rounded to two decimals, in `[0, 1]`.
    pub similarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotableKind {
    /// Matched, but worded noticeably differently.
    Reworded,
    /// Present in the source only.
    MissingInOther,
    /// Present in the other side only.
    MissingInSource,
}

/// A human-readable discrepancy worth surfacing to a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotableDifference {
    pub kind: NotableKind,
    pub item_kind: ItemKind,
    /// Source text (or other text for `MissingInSource`), truncated.
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl fmt::Display for NotableDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.similarity) {
            (NotableKind::Reworded, Some(similarity)) => write!(
                f,
                "{} differs (similarity {similarity:.2}): {}",
                self.item_kind, self.snippet
            ),
            (NotableKind::Reworded, None) => write!(f, "{} differs: {}", self.item_kind, self.snippet),
            (NotableKind::MissingInOther, _) => {
                write!(f, "{} only in source: {}", self.item_kind, self.snippet)
            }
            (NotableKind::MissingInSource, _) => {
                write!(f, "{} only in other: {}", self.item_kind, self.snippet)
            }
        }
    }
}

/// Everything the alignment engine found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub pairs: Vec<DiffPair>,
    pub missing_in_other: Vec<DiffItem>,
    pub missing_in_source: Vec<DiffItem>,
    /// Catalogue labels present on each side, in catalogue order.
    pub source_labels: Vec<String>,
    pub other_labels: Vec<String>,
    pub labels_only_in_source: Vec<String>,
    pub labels_only_in_other: Vec<String>,
    /// At most `AlignConfig::max_notable` entries, in priority order.
    pub notable: Vec<NotableDifference>,
    /// Display-only score in `[0, 100]`.
    pub score: u32,
}

/// Tuning knobs for the alignment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Minimum rounded similarity for a pair to be accepted.
    #[serde(default = "AlignConfig::default_match_threshold")]
    pub match_threshold: f64,
    /// Matched pairs below this similarity are reported as notable.
    #[serde(default = "AlignConfig::default_notable_similarity")]
    pub notable_similarity: f64,
    #[serde(default = "AlignConfig::default_max_notable")]
    pub max_notable: usize,
    /// Snippet length in characters, ellipsis included.
    #[serde(default = "AlignConfig::default_snippet_chars")]
    pub snippet_chars: usize,
    /// Points lost per section label present on only one side.
    #[serde(default = "AlignConfig::default_label_penalty")]
    pub label_penalty: f64,
    /// Points lost per unmatched item on either side.
    #[serde(default = "AlignConfig::default_unmatched_penalty")]
    pub unmatched_penalty: f64,
}

impl AlignConfig {
    pub(crate) fn default_match_threshold() -> f64 {
        0.78
    }

    pub(crate) fn default_notable_similarity() -> f64 {
        0.9
    }

    pub(crate) fn default_max_notable() -> usize {
        5
    }

    pub(crate) fn default_snippet_chars() -> usize {
        160
    }

    pub(crate) fn default_label_penalty() -> f64 {
        4.0
    }

    pub(crate) fn default_unmatched_penalty() -> f64 {
        1.5
    }

    pub fn validate(&self) -> Result<(), AlignError> {
        if !(self.match_threshold > 0.0 && self.match_threshold <= 1.0) {
            return Err(AlignError::InvalidConfig(
                "match_threshold must be in (0.0, 1.0]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.notable_similarity) {
            return Err(AlignError::InvalidConfig(
                "notable_similarity must be between 0.0 and 1.0".into(),
            ));
        }
        if self.snippet_chars < 2 {
            return Err(AlignError::InvalidConfig(
                "snippet_chars must be at least 2".into(),
            ));
        }
        for (name, value) in [
            ("label_penalty", self.label_penalty),
            ("unmatched_penalty", self.unmatched_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AlignError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number"
                )));
            }
        }
        Ok(())
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            match_threshold: Self::default_match_threshold(),
            notable_similarity: Self::default_notable_similarity(),
            max_notable: Self::default_max_notable(),
            snippet_chars: Self::default_snippet_chars(),
            label_penalty: Self::default_label_penalty(),
            unmatched_penalty: Self::default_unmatched_penalty(),
        }
    }
}
