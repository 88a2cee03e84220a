//! # Topic alignment (`align`)
//!
//! Compares two independently sourced descriptions of the same funding topic
//! (typically a work-programme PDF and the public portal page) and reports
//! how well their structure lines up.
//!
//! Both sides are segmented with [`segment::segment`] and flattened into
//! items: one per paragraph, one per list entry. Items are then paired
//! greedily in source order by Jaccard similarity over lowercased word
//! tokens, never across kinds. The result carries the pairs, the unmatched
//! items of each side, section-label presence, up to five notable
//! differences, and a display score in `[0, 100]`.
//!
//! The greedy pass is deliberate and should not be swapped for an optimal
//! assignment: results are defined against it.
//!
//! ```rust
//! let result = align::diff("Reduce emissions by 2030.", "Reduce emissions before 2030.");
//! assert_eq!(result.pairs.len(), 1);
//! assert_eq!(result.pairs[0].source_text, "Reduce emissions by 2030.");
//! ```

mod engine;
mod error;
mod labels;
mod similarity;
mod types;

use segment::Block;

pub use crate::engine::{flatten_items, Aligner};
pub use crate::error::AlignError;
pub use crate::labels::SECTION_LABELS;
pub use crate::similarity::similarity;
pub use crate::types::{
    AlignConfig, AlignmentResult, DiffItem, DiffPair, ItemKind, NotableDifference, NotableKind,
};

/// Aligns two texts with the default configuration.
pub fn diff(source: &str, other: &str) -> AlignmentResult {
    Aligner::default().diff(source, other)
}

/// Aligns two texts with a caller-supplied configuration.
pub fn diff_with_config(
    source: &str,
    other: &str,
    config: &AlignConfig,
) -> Result<AlignmentResult, AlignError> {
    Ok(Aligner::new(config.clone())?.diff(source, other))
}

/// Aligns two already segmented documents with the default configuration.
pub fn diff_blocks(source: &[Block], other: &[Block]) -> AlignmentResult {
    Aligner::default().diff_blocks(source, other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_functions_agree_with_aligner() {
        let source = "Scope: Reduce emissions.\n• cleaner air";
        let other = "Scope: Reduce emissions.\n• cleaner air";
        let via_fn = diff(source, other);
        let via_cfg = diff_with_config(source, other, &AlignConfig::default()).unwrap();
        let via_blocks = diff_blocks(&segment::segment(source), &segment::segment(other));
        assert_eq!(via_fn, via_cfg);
        assert_eq!(via_fn, via_blocks);
        assert_eq!(via_fn.score, 100);
        assert_eq!(via_fn.pairs.len(), 2);
    }

    #[test]
    fn bad_config_surfaces_error() {
        let cfg = AlignConfig {
            snippet_chars: 1,
            ..AlignConfig::default()
        };
        assert!(matches!(
            diff_with_config("a", "b", &cfg),
            Err(AlignError::InvalidConfig(_))
        ));
    }
}
