use serde::{Deserialize, Serialize};

/// Options for [`crate::normalize_pdf_text`].
///
/// The defaults produce a single cleaned line, which is what the alignment
/// engine and the CLI expect. `preserve_newlines` keeps one output line per
/// input line for callers that still need the layout (programme parsers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfNormalizeConfig {
    /// Keep line boundaries instead of flattening to one line.
    pub preserve_newlines: bool,
    /// Fold typographic ligatures (U+FB00..U+FB06) to their plain letters.
    pub fold_ligatures: bool,
}

impl Default for PdfNormalizeConfig {
    fn default() -> Self {
        Self {
            preserve_newlines: false,
            fold_ligatures: true,
        }
    }
}

impl PdfNormalizeConfig {
    pub fn preserving_newlines() -> Self {
        Self {
            preserve_newlines: true,
            ..Self::default()
        }
    }
}
