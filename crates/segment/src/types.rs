use serde::{Deserialize, Serialize};

/// One piece of a prose line, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineToken {
    /// Plain prose.
    Text { text: String },
    /// A citation marker resolved through the document's footnote table.
    Reference { index: usize, raw_id: String },
    /// A section keyword at the start of a block, colon included ("Scope:").
    Label { label: String },
}

impl InlineToken {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Label { label: label.into() }
    }

    pub fn reference(index: usize, raw_id: impl Into<String>) -> Self {
        Self::Reference {
            index,
            raw_id: raw_id.into(),
        }
    }
}

/// One resolved entry of the trailing references block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// 1-based display index, dense in assignment order.
    pub index: usize,
    /// The identifier as it appeared in the source: digits or a URL.
    pub raw_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A structural unit of a topic description.
///
/// A segmented document is a `Vec<Block>` in reading order. At most one
/// [`Block::References`] is present and it is always last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph { tokens: Vec<InlineToken> },
    List { items: Vec<Vec<InlineToken>> },
    References { entries: Vec<ReferenceEntry> },
}

/// Renders tokens back into plain prose.
///
/// Labels are followed by a space, reference markers are dropped, and the
/// result is whitespace-collapsed.
pub fn plain_text(tokens: &[InlineToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            InlineToken::Text { text } => out.push_str(text),
            InlineToken::Label { label } => {
                out.push_str(label);
                out.push(' ');
            }
            InlineToken::Reference { .. } => {}
        }
    }
    normalize::collapse_whitespace(&out)
}
