use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HORIZON_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bhorizon-[a-z0-9]+-\d{4}-").expect("horizon id pattern compiles"));

static EDF_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bedf-\d{4}-[a-z]{2,}").expect("edf id pattern compiles"));

/// Which work programme a text was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFamily {
    Horizon,
    Edf,
    Unknown,
}

/// Guesses the programme family from its text.
///
/// Horizon signals win: "horizon europe", "work programme", or a
/// `HORIZON-XXX-YYYY-` id. EDF needs "european defence fund" plus at least
/// one `EDF-YYYY-XX` id, or three such ids on their own.
pub fn detect_document_family(text: &str) -> DocumentFamily {
    let lower = text.to_lowercase();
    let horizon = lower.contains("horizon europe")
        || lower.contains("work programme")
        || HORIZON_ID.is_match(text);
    if horizon {
        return DocumentFamily::Horizon;
    }

    let edf_ids = EDF_ID.find_iter(text).count();
    let edf_keyword = lower.contains("european defence fund");
    if (edf_keyword && edf_ids > 0) || edf_ids >= 3 {
        return DocumentFamily::Edf;
    }
    DocumentFamily::Unknown
}
