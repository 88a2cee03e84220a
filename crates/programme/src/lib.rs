//! Work-programme parsers.
//!
//! Horizon Europe work programmes and European Defence Fund call documents
//! are long PDFs whose extracted text still carries the structure needed to
//! list topics with their budgets and dates. [`parse_programme`] detects the
//! family and runs the matching parser, and [`ProgrammeDocument::filter`]
//! narrows the result by call type, budget, dates and EDF specifics.
//!
//! ```
//! use programme::{parse_programme, ProgrammeDocument};
//!
//! let text = "Horizon Europe\nHORIZON-HLTH-2026-01-CARE-01: Care models\nRIA 10 4 to 5 2";
//! match parse_programme(text) {
//!     ProgrammeDocument::Horizon { topics } => assert_eq!(topics[0].projects, Some(2)),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

mod edf;
mod family;
mod filter;
mod horizon;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use crate::edf::{parse_edf_records, CallFamily, EdfRecord, RecordLevel};
pub use crate::family::{detect_document_family, DocumentFamily};
pub use crate::filter::{
    date_filter_matches, filter_edf_rows, filter_rows, parse_date, parse_filter_range, EdfFilter,
    ProgrammeRow, RowFilter,
};
pub use crate::horizon::{funding_percentage, parse_horizon_topics, CallStage, HorizonTopic};

/// Parsed records of one work-programme document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgrammeDocument {
    Horizon { topics: Vec<HorizonTopic> },
    Edf { records: Vec<EdfRecord> },
    Unknown,
}

impl ProgrammeDocument {
    pub fn family(&self) -> DocumentFamily {
        match self {
            Self::Horizon { .. } => DocumentFamily::Horizon,
            Self::Edf { .. } => DocumentFamily::Edf,
            Self::Unknown => DocumentFamily::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Horizon { topics } => topics.len(),
            Self::Edf { records } => records.len(),
            Self::Unknown => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies the shared filters, and for EDF documents the EDF filters
    /// first. EDF CALL records are kept as context for their topics.
    pub fn filter(self, rows: &RowFilter, edf: &EdfFilter) -> Self {
        let document = match self {
            Self::Horizon { topics } => Self::Horizon {
                topics: filter_rows(&topics, rows),
            },
            Self::Edf { records } => {
                let narrowed = filter_edf_rows(&records, edf);
                let (topics, calls): (Vec<_>, Vec<_>) = narrowed
                    .into_iter()
                    .partition(|r| r.record_level == RecordLevel::Topic);
                let mut records = filter_rows(&topics, rows);
                records.extend(calls);
                Self::Edf { records }
            }
            Self::Unknown => Self::Unknown,
        };
        debug!(records = document.len(), "programme_filtered");
        document
    }
}

/// Detects the document family and parses it.
pub fn parse_programme(text: &str) -> ProgrammeDocument {
    let document = match detect_document_family(text) {
        DocumentFamily::Horizon => ProgrammeDocument::Horizon {
            topics: parse_horizon_topics(text),
        },
        DocumentFamily::Edf => ProgrammeDocument::Edf {
            records: parse_edf_records(text),
        },
        DocumentFamily::Unknown => ProgrammeDocument::Unknown,
    };
    debug!(family = ?document.family(), records = document.len(), "programme_parsed");
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edf_documents_use_the_edf_parser() {
        let text = "European Defence Fund\nEDF-2025-RA-SENS-X: Sensors\nType of action: Research actions";
        let document = parse_programme(text);
        assert_eq!(document.family(), DocumentFamily::Edf);
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn filters_keep_matching_topics() {
        let text = "Horizon Europe\n\
            Opening: 15 Jan 2026\nDeadline(s): 15 Apr 2026\n\
            HORIZON-HLTH-2026-01-CARE-01: Care models\nRIA 10 4 to 5 2\n\
            HORIZON-HLTH-2026-01-CARE-02: Care pilots\nIA 12 6 to 6 2";
        let document = parse_programme(text);
        assert_eq!(document.len(), 2);

        let rows = RowFilter {
            min_budget_eur_m: Some(5.0),
            deadline: "2026-Q2".into(),
            ..RowFilter::default()
        };
        match document.filter(&rows, &EdfFilter::default()) {
            ProgrammeDocument::Horizon { topics } => {
                assert_eq!(topics.len(), 1);
                assert_eq!(topics[0].action_type.as_deref(), Some("IA"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_documents_are_empty() {
        let document = parse_programme("Minutes of the board meeting");
        assert_eq!(document, ProgrammeDocument::Unknown);
        assert!(document.is_empty());
    }

    #[test]
    fn serializes_with_family_tag() {
        let document = parse_programme("Horizon Europe work programme");
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["type"], "horizon");
        assert_eq!(json["topics"], serde_json::json!([]));
    }
}
