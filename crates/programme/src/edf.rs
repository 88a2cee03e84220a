//! European Defence Fund call-document parser.
//!
//! EDF documents list calls (`EDF-2024-RA`) followed by their topics
//! (`EDF-2024-RA-SENS-QSENS`), each with a small block of key/value lines
//! (type of action, budgets, number of actions, STEP) and a free-text
//! description. The parser emits one record per call header and per topic.

use normalize::{clean_title, collapse_whitespace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TOPIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(\d+(?:\.\d+)*)\.?)?\s*(EDF-\d{4}-[A-Z]{2,}(?:-[A-Z0-9]+)+)\s*:\s*(.+?)\s*$")
        .expect("edf topic line pattern compiles")
});

static TOPIC_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(\d+(?:\.\d+)*)\.?)?\s*(EDF-\d{4}-[A-Z]{2,}(?:-[A-Z0-9]+)+)\s*$")
        .expect("edf topic id pattern compiles")
});

static CALL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(\d+(?:\.\d+)*)\.?)?\s*Call\s+(EDF-\d{4}-[A-Z]{2,})\b[:\-]?\s*(.*)$")
        .expect("edf call line pattern compiles")
});

static CALL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(EDF-\d{4}-[A-Z]{2,})\b").expect("edf call id pattern compiles"));

static TOC_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bTable of contents\b").expect("toc start pattern compiles"));

// The heading itself, not its dot-leadered table-of-contents entry.
static TOC_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*1\.\s*Content of the document\s*$").expect("toc end pattern compiles")
});

static PAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<<<PAGE\s+(\d+)>>>$").expect("page marker pattern compiles"));

static AMOUNT_AFTER_EUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)EUR\s*([0-9][0-9 .,\x{00A0}]*)").expect("eur prefix pattern compiles")
});

static AMOUNT_BEFORE_EUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9][0-9 .,\x{00A0}]*)\s*EUR").expect("eur suffix pattern compiles")
});

static MILLION_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:million|mio|m)\b").expect("million pattern compiles"));

static PERCENTAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})\s?%").expect("percentage pattern compiles"));

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("number pattern compiles"));

static STEP_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bstep\b").expect("step pattern compiles"));

static STEP_YES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bstep\b.*\byes\b").expect("step yes pattern compiles"));

static STEP_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bstep\b.*\bno\b").expect("step no pattern compiles"));

static STEP_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bSTEP\b").expect("step token pattern compiles"));

static LARGE_SCALE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\blarge[-\s]?scale\b").expect("large scale pattern compiles"));

const BAD_TITLE_HINTS: &[&str] = &[
    "SENSITIVE UNTIL ADOPTION",
    "CONTENT OF THE DOCUMENT",
    "TABLE OF CONTENTS",
    "APPENDIX",
    "<<<PAGE",
];

const MAX_TITLE_CHARS: usize = 140;

const FUNDING_KEYWORDS: &[&str] = &[
    "funding rate",
    "funding level",
    "funding intensity",
    "funding percentage",
    "eu funding",
    "union funding",
    "co-funding",
    "cofunding",
];

const DESCRIPTION_HINTS: &[&str] = &[
    "objectives",
    "general objective",
    "specific objective",
    "scope and types of activities",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordLevel {
    Call,
    Topic,
}

/// Action family encoded in the third part of an EDF call id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallFamily {
    Ra,
    Da,
    Csa,
}

impl CallFamily {
    /// `EDF-2024-RA-SENS` and `EDF-2024-RA` are both research actions.
    pub fn from_identifier(id: &str) -> Option<Self> {
        match id.split('-').nth(2)?.to_ascii_uppercase().as_str() {
            "RA" => Some(Self::Ra),
            "DA" => Some(Self::Da),
            "CSA" => Some(Self::Csa),
            _ => None,
        }
    }

    /// The family code as it appears in call ids.
    pub fn code(self) -> &'static str {
        match self {
            Self::Ra => "RA",
            Self::Da => "DA",
            Self::Csa => "CSA",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Ra => "Research Actions",
            Self::Da => "Development Actions",
            Self::Csa => "Coordination & Support Actions",
        }
    }
}

/// One call header or topic of an EDF work programme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdfRecord {
    pub record_level: RecordLevel,
    pub call_id: Option<String>,
    pub topic_id: Option<String>,
    pub topic_title: String,
    pub title: String,
    pub section_no: Option<String>,
    pub type_of_action: String,
    pub indicative_budget_eur_m: Option<f64>,
    pub call_indicative_budget_eur_m: Option<f64>,
    pub number_of_actions: Option<u32>,
    pub call_family: Option<CallFamily>,
    pub step: Option<bool>,
    pub page: Option<u32>,
    pub topic_description_verbatim: String,
    pub is_large_scale: bool,
    pub funding_percentage: Option<f64>,
    pub opening_date: Option<String>,
    pub deadline_date: Option<String>,
}

impl EdfRecord {
    pub(crate) fn empty(record_level: RecordLevel, call_id: Option<String>, page: Option<u32>) -> Self {
        Self {
            record_level,
            call_family: call_id.as_deref().and_then(CallFamily::from_identifier),
            call_id,
            topic_id: None,
            topic_title: String::new(),
            title: String::new(),
            section_no: None,
            type_of_action: String::new(),
            indicative_budget_eur_m: None,
            call_indicative_budget_eur_m: None,
            number_of_actions: None,
            step: None,
            page,
            topic_description_verbatim: String::new(),
            is_large_scale: false,
            funding_percentage: None,
            opening_date: None,
            deadline_date: None,
        }
    }
}

#[derive(Debug)]
struct Draft {
    record: EdfRecord,
    call: Option<usize>,
}

#[derive(Debug, Default)]
struct EdfParser {
    drafts: Vec<Draft>,
    page: Option<u32>,
    in_toc: bool,
    call: Option<usize>,
    call_id: Option<String>,
    topic: Option<usize>,
    in_description: bool,
    awaiting_title: bool,
}

/// Parses the calls and topics of an EDF work programme, in document
/// order. Never fails; text without EDF ids gives an empty list.
pub fn parse_edf_records(text: &str) -> Vec<EdfRecord> {
    let mut parser = EdfParser::default();
    for raw in text.lines() {
        parser.line(raw);
    }
    parser.finish()
}

impl EdfParser {
    fn line(&mut self, raw: &str) {
        let line = collapse_whitespace(&raw.replace('\u{00AD}', ""));

        if let Some(page) = PAGE_MARKER.captures(&line).and_then(|c| c[1].parse().ok()) {
            self.page = Some(page);
            return;
        }
        if TOC_START.is_match(&line) {
            self.in_toc = true;
            return;
        }
        if self.in_toc {
            if TOC_END.is_match(&line) {
                self.in_toc = false;
            }
            return;
        }

        if let Some(caps) = CALL_LINE.captures(&line) {
            let section_no = caps.get(1).map(|m| m.as_str().to_string());
            let call_id = caps[2].to_ascii_uppercase();
            let title = clean_title(&caps[3]);
            self.open_call(call_id, title, section_no);
            return;
        }
        if let Some(caps) = TOPIC_LINE.captures(&line) {
            let section_no = caps.get(1).map(|m| m.as_str().to_string());
            self.open_topic(caps[2].to_ascii_uppercase(), &caps[3], section_no);
            return;
        }
        if let Some(caps) = TOPIC_ONLY.captures(&line) {
            let section_no = caps.get(1).map(|m| m.as_str().to_string());
            self.open_topic(caps[2].to_ascii_uppercase(), "", section_no);
            return;
        }

        let lower = line.to_lowercase();
        let Some(index) = self.topic else {
            self.call_line(&line, &lower);
            return;
        };

        if let Some(budget) = call_budget(&line, &lower) {
            match self.call {
                Some(call) => self.drafts[call].record.call_indicative_budget_eur_m = Some(budget),
                None => self.drafts[index].record.call_indicative_budget_eur_m = Some(budget),
            }
        }

        if self.awaiting_title && !self.in_description && looks_like_title_fragment(&line, &lower) {
            let fragment = clean_title(&line);
            if !is_bad_title(&fragment) {
                self.drafts[index].record.topic_title = fragment;
                self.awaiting_title = false;
            }
        }

        if DESCRIPTION_HINTS.iter().any(|hint| lower.contains(hint)) {
            self.in_description = true;
        }

        let record = &mut self.drafts[index].record;
        if lower.contains("type of action") {
            let value = labelled_value(&line);
            if !value.is_empty() {
                record.type_of_action = value.to_string();
            }
        }
        if let Some(budget) = topic_budget(&line, &lower) {
            record.indicative_budget_eur_m = Some(budget);
        }
        if record.funding_percentage.is_none() {
            record.funding_percentage = funding_percentage(&line, &lower);
        }
        if lower.contains("number of actions") {
            if let Some(count) = FIRST_NUMBER.find(&line).and_then(|m| m.as_str().parse().ok()) {
                record.number_of_actions = Some(count);
            }
        }
        if let Some(step) = step_flag(&line, record.step) {
            record.step = Some(step);
        }

        if self.in_description {
            let description = &mut record.topic_description_verbatim;
            if !description.is_empty() {
                description.push('\n');
            }
            description.push_str(raw.trim_end());
        }

        apply_dates(record, &line, &lower);
    }

    /// Lines between a call header and its first topic.
    fn call_line(&mut self, line: &str, lower: &str) {
        let Some(call) = self.call else {
            return;
        };
        let record = &mut self.drafts[call].record;
        if let Some(budget) = call_budget(line, lower) {
            record.call_indicative_budget_eur_m = Some(budget);
        }
        apply_dates(record, line, lower);
    }

    fn open_call(&mut self, call_id: String, title: String, section_no: Option<String>) {
        let mut record = EdfRecord::empty(RecordLevel::Call, Some(call_id.clone()), self.page);
        record.title = if title.is_empty() { call_id.clone() } else { title };
        record.section_no = section_no;

        self.drafts.push(Draft { record, call: None });
        self.call = Some(self.drafts.len() - 1);
        self.call_id = Some(call_id);
        self.topic = None;
        self.in_description = false;
        self.awaiting_title = false;
    }

    fn open_topic(&mut self, topic_id: String, title: &str, section_no: Option<String>) {
        let mut topic_title = clean_title(title);
        if is_bad_title(&topic_title) {
            topic_title.clear();
        }
        let call_id = self.call_id.clone().or_else(|| call_id_of_topic(&topic_id));

        let mut record = EdfRecord::empty(RecordLevel::Topic, call_id, self.page);
        self.awaiting_title = topic_title.is_empty();
        record.topic_id = Some(topic_id);
        record.topic_title = topic_title;
        record.section_no = section_no;

        self.drafts.push(Draft {
            record,
            call: self.call,
        });
        self.topic = Some(self.drafts.len() - 1);
        self.in_description = false;
    }

    fn finish(self) -> Vec<EdfRecord> {
        let calls: Vec<Option<EdfRecord>> = self
            .drafts
            .iter()
            .map(|draft| (draft.record.record_level == RecordLevel::Call).then(|| draft.record.clone()))
            .collect();

        self.drafts
            .into_iter()
            .map(|Draft { mut record, call }| {
                if record.record_level == RecordLevel::Topic {
                    record.title = if record.topic_title.is_empty() {
                        record.topic_id.clone().unwrap_or_default()
                    } else {
                        record.topic_title.clone()
                    };
                    if let Some(parent) = call.and_then(|i| calls[i].as_ref()) {
                        record.call_indicative_budget_eur_m = record
                            .call_indicative_budget_eur_m
                            .or(parent.call_indicative_budget_eur_m);
                        record.opening_date = record.opening_date.take().or_else(|| parent.opening_date.clone());
                        record.deadline_date = record.deadline_date.take().or_else(|| parent.deadline_date.clone());
                    }
                }
                record.call_family = record
                    .call_family
                    .or_else(|| record.call_id.as_deref().and_then(CallFamily::from_identifier))
                    .or_else(|| record.topic_id.as_deref().and_then(CallFamily::from_identifier));
                record.is_large_scale = is_large_scale(&record);
                record
            })
            .collect()
    }
}

fn call_id_of_topic(topic_id: &str) -> Option<String> {
    if let Some(caps) = CALL_ID.captures(topic_id) {
        return Some(caps[1].to_ascii_uppercase());
    }
    let parts: Vec<&str> = topic_id.split('-').collect();
    (parts.len() >= 3).then(|| parts[..3].join("-").to_ascii_uppercase())
}

fn is_bad_title(title: &str) -> bool {
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return true;
    }
    let upper = title.to_uppercase();
    BAD_TITLE_HINTS.iter().any(|hint| upper.contains(hint))
}

fn looks_like_title_fragment(line: &str, lower: &str) -> bool {
    if line.split_whitespace().count() < 2 {
        return false;
    }
    let key_value = lower.contains("type of action")
        || lower.contains("indicative budget")
        || lower.contains("number of actions");
    !key_value && !TOPIC_ONLY.is_match(line) && !CALL_ID.is_match(line)
}

/// Text after the first `:`, or the whole line when there is none.
fn labelled_value(line: &str) -> &str {
    line.split_once(':').map_or(line, |(_, value)| value).trim()
}

fn apply_dates(record: &mut EdfRecord, line: &str, lower: &str) {
    if lower.contains("opening date") {
        let value = labelled_value(line);
        if !value.is_empty() {
            record.opening_date = Some(value.to_string());
        }
    }
    if lower.contains("deadline") {
        let value = labelled_value(line);
        if !value.is_empty() {
            record.deadline_date = Some(value.to_string());
        }
    }
}

fn call_budget(line: &str, lower: &str) -> Option<f64> {
    if lower.contains("indicative budget for the call") {
        budget_eur_m(line)
    } else {
        None
    }
}

fn topic_budget(line: &str, lower: &str) -> Option<f64> {
    if lower.contains("indicative budget") && lower.contains("for this topic") {
        budget_eur_m(line)
    } else {
        None
    }
}

/// The first EUR amount on the line, in millions.
fn budget_eur_m(line: &str) -> Option<f64> {
    let caps = AMOUNT_AFTER_EUR
        .captures(line)
        .or_else(|| AMOUNT_BEFORE_EUR.captures(line))?;
    let amount = caps.get(1)?;
    let value = parse_amount(amount.as_str())?;
    if MILLION_WORD.is_match(&line[amount.end()..]) {
        return Some(round2(value));
    }
    Some(round2(value / 1_000_000.0))
}

/// `100 000 000`, `100,000,000` and `100.000.000` are the same amount.
fn parse_amount(text: &str) -> Option<f64> {
    let mut digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.matches('.').count() > 1 {
        digits.retain(|c| c != '.');
    }
    let digits = digits.trim_end_matches('.');
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn funding_percentage(line: &str, lower: &str) -> Option<f64> {
    if !FUNDING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return None;
    }
    PERCENTAGE
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
}

fn step_flag(line: &str, current: Option<bool>) -> Option<bool> {
    if !STEP_WORD.is_match(line) {
        return None;
    }
    if STEP_YES.is_match(line) {
        Some(true)
    } else if STEP_NO.is_match(line) {
        Some(false)
    } else if current.is_none() && STEP_TOKEN.is_match(line) {
        Some(true)
    } else {
        None
    }
}

fn has_large_scale_token(id: Option<&str>) -> bool {
    id.is_some_and(|id| {
        id.split('-')
            .skip(3)
            .any(|part| part.eq_ignore_ascii_case("LS"))
    })
}

fn is_large_scale(record: &EdfRecord) -> bool {
    has_large_scale_token(record.topic_id.as_deref())
        || has_large_scale_token(record.call_id.as_deref())
        || LARGE_SCALE.is_match(&record.title)
        || LARGE_SCALE.is_match(&record.topic_description_verbatim)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
EUROPEAN DEFENCE FUND (EDF) CALL TOPIC DESCRIPTIONS
Table of contents
1. Content of the document ........ 3
2. Call EDF-2024-RA ........ 4
2.1. EDF-2024-RA-SENS-QSENS: Quantum sensors ........ 4
1. Content of the document
<<<PAGE 4>>>
2. Call EDF-2024-RA - Research actions
Indicative budget for the call: EUR 60 000 000
Opening date: 20 June 2024
Deadline: 5 November 2024 17:00:00 Brussels
2.1. EDF-2024-RA-SENS-QSENS: Quantum sensors
Type of action: Research actions
Indicative budget for this topic: EUR 25 000 000
Number of actions to be funded: Up to 2
Funding rate: 100% EU funding
Objectives
General objective
Quantum sensors promise large-scale gains in navigation.
STEP: yes
<<<PAGE 5>>>
2.2. EDF-2024-RA-LS-GRID
Resilient battlefield grids
Type of action: Research actions
Indicative budget for this topic: EUR 40 000 000
STEP topic: no
";

    #[test]
    fn parses_calls_and_topics() {
        let records = parse_edf_records(SAMPLE);
        assert_eq!(records.len(), 3);

        let call = &records[0];
        assert_eq!(call.record_level, RecordLevel::Call);
        assert_eq!(call.call_id.as_deref(), Some("EDF-2024-RA"));
        assert_eq!(call.title, "Research actions");
        assert_eq!(call.section_no.as_deref(), Some("2"));
        assert_eq!(call.call_indicative_budget_eur_m, Some(60.0));
        assert_eq!(call.call_family, Some(CallFamily::Ra));
        assert_eq!(call.page, Some(4));

        let sensors = &records[1];
        assert_eq!(sensors.record_level, RecordLevel::Topic);
        assert_eq!(sensors.topic_id.as_deref(), Some("EDF-2024-RA-SENS-QSENS"));
        assert_eq!(sensors.title, "Quantum sensors");
        assert_eq!(sensors.section_no.as_deref(), Some("2.1"));
        assert_eq!(sensors.type_of_action, "Research actions");
        assert_eq!(sensors.indicative_budget_eur_m, Some(25.0));
        assert_eq!(sensors.call_indicative_budget_eur_m, Some(60.0));
        assert_eq!(sensors.number_of_actions, Some(2));
        assert_eq!(sensors.funding_percentage, Some(100.0));
        assert_eq!(sensors.step, Some(true));
        assert_eq!(sensors.opening_date.as_deref(), Some("20 June 2024"));
        assert_eq!(sensors.deadline_date.as_deref(), Some("5 November 2024 17:00:00 Brussels"));
        assert!(sensors.is_large_scale);
        assert!(sensors
            .topic_description_verbatim
            .starts_with("Objectives\nGeneral objective\nQuantum sensors"));

        let grid = &records[2];
        assert_eq!(grid.title, "Resilient battlefield grids");
        assert_eq!(grid.page, Some(5));
        assert_eq!(grid.step, Some(false));
        assert_eq!(grid.indicative_budget_eur_m, Some(40.0));
        assert!(grid.is_large_scale);
    }

    #[test]
    fn table_of_contents_entries_are_skipped() {
        let records = parse_edf_records(SAMPLE);
        let sensors = records
            .iter()
            .filter(|r| r.topic_id.as_deref() == Some("EDF-2024-RA-SENS-QSENS"))
            .count();
        assert_eq!(sensors, 1);
    }

    #[test]
    fn topic_without_call_header_derives_call() {
        let records = parse_edf_records("EDF-2025-DA-SPACE-SSA: Space situational awareness");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].call_id.as_deref(), Some("EDF-2025-DA"));
        assert_eq!(records[0].call_family, Some(CallFamily::Da));
        assert!(!records[0].is_large_scale);
    }

    #[test]
    fn untitled_topic_falls_back_to_id() {
        let records = parse_edf_records("EDF-2025-CSA-TEST\nType of action: Coordination actions");
        assert_eq!(records[0].topic_title, "");
        assert_eq!(records[0].title, "EDF-2025-CSA-TEST");
        assert_eq!(records[0].call_family, Some(CallFamily::Csa));
    }

    #[test]
    fn percentages_need_funding_wording() {
        let records = parse_edf_records("EDF-2025-RA-X-Y: Topic\nAround 30% of the effort goes to testing.");
        assert_eq!(records[0].funding_percentage, None);
    }

    #[test]
    fn amounts_are_read_in_millions() {
        assert_eq!(budget_eur_m("budget: EUR 1.500.000"), Some(1.5));
        assert_eq!(budget_eur_m("EUR 2,500,000.50"), Some(2.5));
        assert_eq!(budget_eur_m("EUR 20 million"), Some(20.0));
        assert_eq!(budget_eur_m("4 000 000 EUR"), Some(4.0));
        assert_eq!(budget_eur_m("no amount"), None);
    }

    #[test]
    fn step_word_in_prose_is_not_a_flag() {
        assert_eq!(step_flag("a first step towards autonomy", None), None);
        assert_eq!(step_flag("STEP", None), Some(true));
        assert_eq!(step_flag("Eligible for STEP: no", Some(true)), Some(false));
    }

    #[test]
    fn empty_text_has_no_records() {
        assert!(parse_edf_records("").is_empty());
    }
}
