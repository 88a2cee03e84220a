//! Workspace umbrella crate for topicdiff.
//!
//! Compares the description of a funding topic as it appears in a work
//! programme document with the description published on the funding portal.
//! The stages live in their own crates and are re-exported here:
//!
//! - [`normalize`]: PDF and generic text cleanup
//! - [`segment`]: paragraphs, lists and references with stable footnote indices
//! - [`align`]: greedy similarity alignment and a 0-100 consistency score
//! - [`portal`]: fetching a topic page and extracting its description
//! - [`programme`]: Horizon Europe and EDF work-programme parsers
//!
//! ```
//! let result = topicdiff::compare_texts(
//!     "Scope: Reduce emissions.\n• cleaner air",
//!     "Scope: Reduce emissions.\n• cleaner air",
//! );
//! assert_eq!(result.score, 100);
//! ```

pub mod config;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use align::{
    AlignConfig, AlignError, Aligner, AlignmentResult, DiffItem, DiffPair, ItemKind,
    NotableDifference, NotableKind,
};
pub use config::{ConfigLoadError, TopicDiffConfig};
pub use normalize::{normalize_pdf_text, normalize_text, PdfNormalizeConfig};
pub use portal::{
    extract, extract_from_html, topic_portal_url, try_extract, HttpFetcher, PageFetcher,
    PortalConfig, PortalError, PortalTopic, Url,
};
pub use programme::{
    detect_document_family, filter_edf_rows, filter_rows, parse_edf_records, parse_horizon_topics,
    parse_programme, DocumentFamily, EdfFilter, EdfRecord, HorizonTopic, ProgrammeDocument,
    RowFilter,
};
pub use segment::{plain_text, Block, InlineToken, ReferenceEntry};

/// A work-programme topic aligned against its portal page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicComparison {
    pub portal: PortalTopic,
    pub alignment: AlignmentResult,
}

/// Runs the generic normalizer and the segmenter over raw text.
pub fn segment_document(raw: &str) -> Vec<Block> {
    let blocks = segment::segment(&normalize_text(raw));
    debug!(input_len = raw.len(), blocks = blocks.len(), "document_segmented");
    blocks
}

/// Aligns a document-derived description (source) against the portal text
/// (other) with the default configuration.
pub fn compare_texts(document: &str, portal: &str) -> AlignmentResult {
    compare_texts_with(&Aligner::default(), document, portal)
}

pub fn compare_texts_with(aligner: &Aligner, document: &str, portal: &str) -> AlignmentResult {
    aligner.diff_blocks(&segment_document(document), &segment_document(portal))
}

/// Aligns independent `(document, portal)` pairs in parallel. Results keep
/// the input order.
pub fn compare_many<S>(pairs: &[(S, S)]) -> Vec<AlignmentResult>
where
    S: AsRef<str> + Sync,
{
    let aligner = Aligner::default();
    let results: Vec<AlignmentResult> = pairs
        .par_iter()
        .map(|(document, portal)| compare_texts_with(&aligner, document.as_ref(), portal.as_ref()))
        .collect();
    debug!(pairs = results.len(), "batch_compared");
    results
}

/// Fetches the portal page at `url` and aligns `document` against its topic
/// description. `None` whenever the portal side cannot be extracted.
pub async fn compare_with_portal(
    document: &str,
    url: &str,
    fetcher: &dyn PageFetcher,
    config: &PortalConfig,
) -> Option<TopicComparison> {
    compare_with_portal_using(&Aligner::default(), document, url, fetcher, config).await
}

pub async fn compare_with_portal_using(
    aligner: &Aligner,
    document: &str,
    url: &str,
    fetcher: &dyn PageFetcher,
    config: &PortalConfig,
) -> Option<TopicComparison> {
    let topic = portal::extract(url, fetcher, config).await?;
    let alignment = aligner.diff_blocks(&segment_document(document), &topic.blocks);
    info!(
        url = %topic.url,
        score = alignment.score,
        pairs = alignment.pairs.len(),
        notable = alignment.notable.len(),
        "topic_compared"
    );
    Some(TopicComparison {
        portal: topic,
        alignment,
    })
}

/// Renders blocks as plain text for a spreadsheet cell or a terminal.
///
/// Paragraphs are separated by blank lines, list items start with "• ",
/// reference markers print as `[n]`, and the references come last.
pub fn flatten_blocks(blocks: &[Block]) -> String {
    let mut sections = Vec::new();
    let mut references = Vec::new();

    for block in blocks {
        match block {
            Block::Paragraph { tokens } => {
                let text = render_tokens(tokens);
                if !text.is_empty() {
                    sections.push(text);
                }
            }
            Block::List { items } => {
                let lines: Vec<String> = items
                    .iter()
                    .map(|item| format!("• {}", render_tokens(item)))
                    .collect();
                if !lines.is_empty() {
                    sections.push(lines.join("\n"));
                }
            }
            Block::References { entries } => {
                references.extend(entries.iter().map(render_reference));
            }
        }
    }

    if !references.is_empty() {
        sections.push(references.join("\n"));
    }
    sections.join("\n\n")
}

fn render_tokens(tokens: &[InlineToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            InlineToken::Text { text } => out.push_str(text),
            InlineToken::Label { label } => {
                out.push_str(label);
                out.push(' ');
            }
            InlineToken::Reference { index, .. } => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    normalize::collapse_whitespace(&out)
}

fn render_reference(entry: &ReferenceEntry) -> String {
    let mut parts = vec![format!("[{}]", entry.index)];
    parts.extend(entry.text.clone());
    parts.extend(entry.url.clone());
    if parts.len() == 1 {
        parts.push(entry.raw_id.clone());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_paragraphs_lists_and_references() {
        let blocks = vec![
            Block::Paragraph {
                tokens: vec![
                    InlineToken::label("Scope:"),
                    InlineToken::text("See the strategy"),
                    InlineToken::reference(1, "7"),
                    InlineToken::text("."),
                ],
            },
            Block::List {
                items: vec![
                    vec![InlineToken::text("cleaner air;")],
                    vec![InlineToken::text("better data.")],
                ],
            },
            Block::References {
                entries: vec![
                    ReferenceEntry {
                        index: 1,
                        raw_id: "7".into(),
                        url: Some("https://example.org/strategy".into()),
                        text: None,
                    },
                    ReferenceEntry {
                        index: 2,
                        raw_id: "9".into(),
                        url: None,
                        text: None,
                    },
                ],
            },
        ];

        assert_eq!(
            flatten_blocks(&blocks),
            "Scope: See the strategy[1].\n\n• cleaner air;\n• better data.\n\n[1] https://example.org/strategy\n[2] 9"
        );
    }

    #[test]
    fn flattening_nothing_is_empty() {
        assert_eq!(flatten_blocks(&[]), "");
    }

    #[test]
    fn segment_document_normalizes_first() {
        let blocks = segment_document("Scope:\u{00A0}Reduce emis\u{00AD}sions.");
        assert_eq!(flatten_blocks(&blocks), "Scope: Reduce emissions.");
    }

    #[test]
    fn compare_many_keeps_order() {
        let pairs = vec![
            ("Scope: Reduce emissions.", "Scope: Reduce emissions."),
            ("Scope: Reduce emissions.", ""),
        ];
        let results = compare_many(&pairs);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, 100);
        assert_eq!(results[1], compare_texts("Scope: Reduce emissions.", ""));
    }
}
