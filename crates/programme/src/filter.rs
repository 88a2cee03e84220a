//! Row filters over parsed work-programme records.
//!
//! Date filters name a period (`2026`, `2026-Q3`, `2026-09`, `2026-09-23`)
//! and keep rows dated on or before its last day. A filter that is not a
//! period falls back to a case-insensitive prefix match on the raw date.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::edf::{EdfRecord, RecordLevel};
use crate::horizon::HorizonTopic;

static ISO_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("iso day pattern compiles"));

static ISO_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("iso month pattern compiles"));

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("year pattern compiles"));

static QUARTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{4})-Q([1-4])$").expect("quarter pattern compiles"));

static DAY_MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,})\.?,?\s+(\d{4})$").expect("textual date pattern compiles")
});

static DAY_MONTH_NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[./](\d{1,2})[./](\d{4})$").expect("numeric date pattern compiles")
});

/// English names and abbreviations, then Italian names for localized PDFs.
const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
    ("gen", 1),
    ("gennaio", 1),
    ("febbraio", 2),
    ("marzo", 3),
    ("aprile", 4),
    ("maggio", 5),
    ("giugno", 6),
    ("luglio", 7),
    ("agosto", 8),
    ("settembre", 9),
    ("ottobre", 10),
    ("novembre", 11),
    ("dicembre", 12),
];

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(_, month)| month)
}

fn number<T: std::str::FromStr>(caps: &regex::Captures<'_>, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Reads a row date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM` (last day of the month), `YYYY`
/// (31 December), `23 Sep 2026` / `23 settembre 2026`, and `23/09/2026` or
/// `23.09.2026`. Trailing `.`, `,` and `;` are ignored.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim().trim_end_matches(['.', ',', ';']);
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DAY.captures(text) {
        return NaiveDate::from_ymd_opt(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?);
    }
    if let Some(caps) = ISO_MONTH.captures(text) {
        return month_end(number(&caps, 1)?, number(&caps, 2)?);
    }
    if let Some(caps) = YEAR.captures(text) {
        return NaiveDate::from_ymd_opt(number(&caps, 1)?, 12, 31);
    }
    if let Some(caps) = DAY_MONTH_NAME.captures(text) {
        let month = month_number(&caps[2])?;
        return NaiveDate::from_ymd_opt(number(&caps, 3)?, month, number(&caps, 1)?);
    }
    if let Some(caps) = DAY_MONTH_NUMERIC.captures(text) {
        return NaiveDate::from_ymd_opt(number(&caps, 3)?, number(&caps, 2)?, number(&caps, 1)?);
    }
    None
}

/// Last day of the period a date filter names, or `None` when the filter
/// is empty or not a period.
pub fn parse_filter_range(filter: &str) -> Option<NaiveDate> {
    let filter = filter.trim();
    if let Some(caps) = YEAR.captures(filter) {
        return NaiveDate::from_ymd_opt(number(&caps, 1)?, 12, 31);
    }
    if let Some(caps) = QUARTER.captures(filter) {
        let quarter: u32 = number(&caps, 2)?;
        return month_end(number(&caps, 1)?, quarter * 3);
    }
    if let Some(caps) = ISO_MONTH.captures(filter) {
        return month_end(number(&caps, 1)?, number(&caps, 2)?);
    }
    if let Some(caps) = ISO_DAY.captures(filter) {
        return NaiveDate::from_ymd_opt(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?);
    }
    None
}

/// Whether a row date passes a date filter. An empty filter passes
/// everything; a row without a date fails any non-empty filter.
pub fn date_filter_matches(value: Option<&str>, filter: &str) -> bool {
    let filter = filter.trim();
    if filter.is_empty() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    match parse_filter_range(filter) {
        Some(end) => parse_date(value).is_some_and(|date| date <= end),
        None => value
            .trim()
            .to_lowercase()
            .starts_with(&filter.to_lowercase()),
    }
}

/// What the shared filters read from a parsed row.
pub trait ProgrammeRow {
    /// Action or call type shown to users ("RIA", "Research actions").
    fn call_type(&self) -> Option<String>;
    /// Budget compared against the minimum budget filter, in EUR million.
    fn filter_budget_eur_m(&self) -> Option<f64>;
    fn opening_date(&self) -> Option<&str>;
    fn deadline_date(&self) -> Option<&str>;
}

impl ProgrammeRow for HorizonTopic {
    fn call_type(&self) -> Option<String> {
        self.action_type.clone()
    }

    fn filter_budget_eur_m(&self) -> Option<f64> {
        self.budget_per_project_min_eur_m
            .or_else(|| self.budget_per_project_eur_m())
    }

    fn opening_date(&self) -> Option<&str> {
        self.opening_date.as_deref()
    }

    fn deadline_date(&self) -> Option<&str> {
        self.deadline_date.as_deref()
    }
}

impl ProgrammeRow for EdfRecord {
    fn call_type(&self) -> Option<String> {
        if !self.type_of_action.trim().is_empty() {
            return Some(self.type_of_action.clone());
        }
        self.call_family.map(|family| family.description().to_string())
    }

    fn filter_budget_eur_m(&self) -> Option<f64> {
        self.indicative_budget_eur_m
    }

    fn opening_date(&self) -> Option<&str> {
        self.opening_date.as_deref()
    }

    fn deadline_date(&self) -> Option<&str> {
        self.deadline_date.as_deref()
    }
}

/// Filters shared by both programme families.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowFilter {
    /// Accepted call types, compared case-insensitively. Empty accepts all.
    pub call_types: Vec<String>,
    /// Rows below this budget are dropped; rows without a budget count as 0.
    pub min_budget_eur_m: Option<f64>,
    /// Opening-date period (`2026`, `2026-Q1`, `2026-03`, `2026-03-15`).
    pub opening: String,
    /// Deadline period, same forms as `opening`.
    pub deadline: String,
}

impl RowFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches<R: ProgrammeRow>(&self, row: &R) -> bool {
        let allowed = self
            .call_types
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();
        if !allowed.is_empty() {
            let current = row.call_type().unwrap_or_default().trim().to_lowercase();
            if !allowed.contains(&current) {
                return false;
            }
        }

        if let Some(min) = self.min_budget_eur_m {
            if row.filter_budget_eur_m().unwrap_or(0.0) < min {
                return false;
            }
        }

        date_filter_matches(row.opening_date(), &self.opening)
            && date_filter_matches(row.deadline_date(), &self.deadline)
    }
}

/// Keeps the rows that pass `filter`, in order.
pub fn filter_rows<R: ProgrammeRow + Clone>(rows: &[R], filter: &RowFilter) -> Vec<R> {
    rows.iter().filter(|row| filter.matches(*row)).cloned().collect()
}

/// EDF-only filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdfFilter {
    /// Prefix of the call family code ("RA", "DA", "CSA"), case-insensitive.
    pub call_family: String,
    pub budget_min_eur_m: Option<f64>,
    pub budget_max_eur_m: Option<f64>,
    /// Required STEP flag. Rows with an unknown flag fail when set.
    pub step: Option<bool>,
}

impl EdfFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, record: &EdfRecord) -> bool {
        let family = self.call_family.trim().to_lowercase();
        if !family.is_empty() {
            let current = record
                .call_family
                .map(|f| f.code().to_lowercase())
                .unwrap_or_default();
            if !current.starts_with(&family) {
                return false;
            }
        }

        if self.budget_min_eur_m.is_some() || self.budget_max_eur_m.is_some() {
            let Some(budget) = record.indicative_budget_eur_m else {
                return false;
            };
            if self.budget_min_eur_m.is_some_and(|min| budget < min)
                || self.budget_max_eur_m.is_some_and(|max| budget > max)
            {
                return false;
            }
        }

        match self.step {
            Some(wanted) => record.step == Some(wanted),
            None => true,
        }
    }
}

/// Keeps the TOPIC records that pass `filter`. CALL records are context
/// for their topics and are always kept, after the topics.
pub fn filter_edf_rows(records: &[EdfRecord], filter: &EdfFilter) -> Vec<EdfRecord> {
    let topics = records
        .iter()
        .filter(|r| r.record_level == RecordLevel::Topic && filter.matches(r));
    let calls = records.iter().filter(|r| r.record_level == RecordLevel::Call);
    topics.chain(calls).cloned().collect()
}
