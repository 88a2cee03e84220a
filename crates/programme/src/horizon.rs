//! Horizon Europe work-programme parser.
//!
//! Walks the extracted text line by line, keeping the context a topic
//! inherits (page, cluster, call id, opening and deadline) and reading each
//! topic's id, possibly multi-line title, and overview row:
//!
//! ```text
//! RIA 20.60 9.00 to 10.00 2
//! ^   ^     ^            ^ indicative number of projects
//! |   |     +------------- EU contribution per project (EUR million)
//! |   +------------------- total budget (EUR million)
//! +----------------------- type of action
//! ```

use normalize::{clean_title, collapse_whitespace, strip_dot_leader};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static CALL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bHORIZON-[A-Z0-9]+-\d{4}-(?:[A-Z]\d-)?\d{2}(?:-two-stage)?\b")
        .expect("horizon call id pattern compiles")
});

static TOPIC_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bHORIZON-[A-Z0-9]+-\d{4}-(?:[A-Z]\d-)?\d{2}-[A-Z0-9]+(?:-[A-Z0-9]+)*(?:-two-stage)?\b",
    )
    .expect("horizon topic id pattern compiles")
});

static CALL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(HORIZON-[A-Z0-9]+-\d{4}-(?:[A-Z]\d-)?\d{2})-").expect("call prefix pattern compiles")
});

static OPENING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Opening:\s*(.+)").expect("opening pattern compiles"));

static DEADLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Deadline\(s\):\s*(.+)").expect("deadline pattern compiles"));

static PAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<<<PAGE\s+(\d+)>>>$").expect("page marker pattern compiles"));

static ACTION_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(RIA|IA|CSA|PCP|PPI|COFUND)\s+(.*)$").expect("action row pattern compiles")
});

static AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,4}(?:\.\d{1,2})?").expect("amount pattern compiles"));

static PROJECT_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(\d{1,3})\s*$").expect("project count pattern compiles"));

static AMOUNT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,4}(?:\.\d{1,2})?)\s+to\s+(\d{1,4}(?:\.\d{1,2})?)\b")
        .expect("amount range pattern compiles")
});

static AROUND_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bAround\s+(\d{1,4}(?:\.\d{1,2})?)\b").expect("around amount pattern compiles")
});

const ACTION_TYPES: &[&str] = &["RIA", "IA", "CSA", "PCP", "PPI", "COFUND"];

/// Lines the overview row may be spread over.
const OVERVIEW_WINDOW: usize = 8;

/// Lines after the id that may still belong to the title.
const MAX_TITLE_LINES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStage {
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "two-stage")]
    TwoStage,
}

/// One topic of a Horizon Europe work programme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonTopic {
    pub cluster: Option<String>,
    pub stage: Option<CallStage>,
    pub call_round: Option<String>,
    pub page: Option<u32>,
    pub call_id: Option<String>,
    pub topic_id: String,
    pub topic_title: String,
    pub action_type: Option<String>,
    pub opening_date: Option<String>,
    pub deadline_date: Option<String>,
    pub budget_eur_m: Option<f64>,
    pub projects: Option<u32>,
    pub budget_per_project_min_eur_m: Option<f64>,
    pub budget_per_project_max_eur_m: Option<f64>,
}

impl HorizonTopic {
    /// Per-project budget shown for the topic: the smaller end of the
    /// announced range, or whichever end is known.
    pub fn budget_per_project_eur_m(&self) -> Option<f64> {
        match (self.budget_per_project_min_eur_m, self.budget_per_project_max_eur_m) {
            (Some(min), Some(max)) => Some(min.min(max)),
            (min, max) => min.or(max),
        }
    }

    /// EU funding rate implied by the action type, given the topic text.
    pub fn funding_percentage(&self, description: &str) -> Option<u8> {
        funding_percentage(self.action_type.as_deref()?, description)
    }
}

/// Funding rate for a Horizon action type.
///
/// Research and innovation actions and coordination and support actions are
/// funded at 100%. Innovation actions get 70%, or 100% when the topic text
/// mentions non-profit beneficiaries. Other types (PCP, PPI, COFUND) depend
/// on the call text and yield `None`.
pub fn funding_percentage(action_type: &str, description: &str) -> Option<u8> {
    match action_type.trim().to_ascii_uppercase().as_str() {
        "RIA" | "CSA" => Some(100),
        "IA" => {
            let text = description.to_lowercase();
            if text.contains("non-profit") || text.contains("non profit") {
                Some(100)
            } else {
                Some(70)
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Overview {
    action_type: String,
    budget_eur_m: f64,
    per_project_min: f64,
    per_project_max: f64,
    projects: u32,
}

#[derive(Debug)]
struct PendingTopic {
    topic_id: String,
    title_parts: Vec<String>,
    page: Option<u32>,
    overview: Option<Overview>,
}

#[derive(Debug, Default)]
struct HorizonParser {
    topics: Vec<HorizonTopic>,
    page: Option<u32>,
    cluster: Option<String>,
    stage: Option<CallStage>,
    call_round: Option<String>,
    cluster_page: Option<u32>,
    call_id: Option<String>,
    opening: Option<String>,
    deadline: Option<String>,
}

/// Parses every topic of a Horizon Europe work programme.
///
/// `<<<PAGE n>>>` marker lines, when present, give each topic its page.
/// Never fails; text without topic ids gives an empty list.
pub fn parse_horizon_topics(text: &str) -> Vec<HorizonTopic> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let mut parser = HorizonParser::default();
    parser.run(&lines);
    parser.topics
}

impl HorizonParser {
    fn run(&mut self, lines: &[&str]) {
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            i += 1;

            if let Some(page) = page_marker(line) {
                self.page = Some(page);
            } else if let Some(rest) = line.strip_prefix("Call - ") {
                self.start_cluster(rest);
            } else if let Some(call_id) = call_id_line(line) {
                self.call_id = Some(call_id.to_string());
            } else if let Some(caps) = OPENING.captures(line) {
                self.opening = Some(collapse_whitespace(&caps[1]));
            } else if let Some(caps) = DEADLINE.captures(line) {
                self.deadline = Some(collapse_whitespace(&caps[1]));
            } else if let Some(found) = TOPIC_ID.find(line) {
                let mut pending = self.start_topic(found.as_str(), line);
                i = self.read_topic_body(lines, i, &mut pending);
                self.flush(pending);
            }
        }
    }

    fn start_cluster(&mut self, rest: &str) {
        let (cleaned, page) = strip_dot_leader(&collapse_whitespace(rest));
        self.cluster_page = page;
        self.stage = None;
        self.call_round = None;

        let mut cluster = cleaned.clone();
        if let (Some(open), Some(close)) = (cleaned.find('('), cleaned.rfind(')')) {
            if open < close {
                cluster = cleaned[..open].trim().to_string();
                let inside = cleaned[open + 1..close].trim();
                let lower = inside.to_lowercase();
                if lower.contains("single stage") {
                    self.stage = Some(CallStage::Single);
                } else if lower.contains("two-stage") || lower.contains("two stage") {
                    self.stage = Some(CallStage::TwoStage);
                }
                let parts: Vec<&str> = inside
                    .split('-')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect();
                if parts.len() >= 2 {
                    self.call_round = parts.last().map(|p| p.to_string());
                }
            }
        }
        self.cluster = (!cluster.is_empty()).then_some(cluster);

        self.call_id = None;
        self.opening = None;
        self.deadline = None;
    }

    fn start_topic(&self, topic_id: &str, line: &str) -> PendingTopic {
        let (cleaned, leader_page) = strip_dot_leader(&collapse_whitespace(line));
        let title_parts = cleaned
            .split_once(':')
            .map(|(_, title)| vec![collapse_whitespace(title)])
            .unwrap_or_default();
        PendingTopic {
            topic_id: topic_id.to_string(),
            title_parts,
            page: self.page.or(leader_page),
            overview: None,
        }
    }

    /// Collects title lines and the overview row. Returns the index of the
    /// first line not consumed.
    fn read_topic_body(&mut self, lines: &[&str], mut i: usize, pending: &mut PendingTopic) -> usize {
        while i < lines.len() {
            let next = lines[i];
            if starts_new_block(next) {
                break;
            }
            if let Some(page) = page_marker(next) {
                self.page = Some(page);
                i += 1;
                continue;
            }
            if starts_with_action_type(next) {
                if let Some((overview, resume)) = parse_overview(lines, i) {
                    pending.overview = Some(overview);
                    return resume;
                }
            }
            if !next.starts_with("Destination - ") && pending.title_parts.len() < MAX_TITLE_LINES {
                pending.title_parts.push(collapse_whitespace(next));
            }
            i += 1;
        }
        i
    }

    fn flush(&mut self, pending: PendingTopic) {
        let title_raw = collapse_whitespace(&pending.title_parts.join(" "));
        let (title, title_page) = strip_dot_leader(&title_raw);
        let page = title_page
            .or(pending.page)
            .or(self.page)
            .or(self.cluster_page);

        if self.call_id.is_none() {
            self.call_id = derive_call_id(&pending.topic_id);
        }

        let overview = pending.overview;
        self.topics.push(HorizonTopic {
            cluster: self.cluster.clone(),
            stage: self.stage,
            call_round: self.call_round.clone(),
            page,
            call_id: self.call_id.clone(),
            topic_id: pending.topic_id,
            topic_title: clean_title(&title),
            action_type: overview.as_ref().map(|o| o.action_type.clone()),
            opening_date: self.opening.clone(),
            deadline_date: self.deadline.clone(),
            budget_eur_m: overview.as_ref().map(|o| o.budget_eur_m),
            projects: overview.as_ref().map(|o| o.projects),
            budget_per_project_min_eur_m: overview.as_ref().map(|o| o.per_project_min),
            budget_per_project_max_eur_m: overview.as_ref().map(|o| o.per_project_max),
        });
    }
}

fn page_marker(line: &str) -> Option<u32> {
    PAGE_MARKER.captures(line).and_then(|caps| caps[1].parse().ok())
}

/// A line carrying a call id but no topic id.
fn call_id_line(line: &str) -> Option<&str> {
    if TOPIC_ID.is_match(line) {
        return None;
    }
    CALL_ID.find(line).map(|m| m.as_str())
}

fn starts_new_block(line: &str) -> bool {
    line.starts_with("Call - ") || TOPIC_ID.is_match(line) || call_id_line(line).is_some()
}

fn starts_with_action_type(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|first| ACTION_TYPES.contains(&first))
}

/// `HORIZON-HLTH-2026-01-STAYHLTH-02` belongs to call `HORIZON-HLTH-2026-01`.
fn derive_call_id(topic_id: &str) -> Option<String> {
    CALL_PREFIX
        .captures(topic_id)
        .map(|caps| caps[1].to_string())
}

fn parse_overview(lines: &[&str], start: usize) -> Option<(Overview, usize)> {
    let mut buffer: Vec<&str> = Vec::new();
    let mut i = start;
    for _ in 0..OVERVIEW_WINDOW {
        let Some(line) = lines.get(i).map(|l| l.trim()) else {
            break;
        };
        if line.is_empty() {
            i += 1;
            continue;
        }
        if starts_new_block(line) {
            break;
        }
        buffer.push(line);
        if let Some(overview) = overview_from_row(&collapse_whitespace(&buffer.join(" "))) {
            return Some((overview, i + 1));
        }
        i += 1;
    }
    None
}

fn overview_from_row(row: &str) -> Option<Overview> {
    let caps = ACTION_ROW.captures(row)?;
    let action_type = caps[1].to_string();
    let rest = caps.get(2)?.as_str();

    let budget_eur_m = AMOUNT.find(rest)?.as_str().parse().ok()?;
    let projects = PROJECT_COUNT.captures(rest)?[1].parse().ok()?;

    let (per_project_min, per_project_max) = if let Some(range) = AMOUNT_RANGE.captures(rest) {
        (range[1].parse().ok()?, range[2].parse().ok()?)
    } else {
        let around: f64 = AROUND_AMOUNT.captures(rest)?[1].parse().ok()?;
        (around, around)
    };

    Some(Overview {
        action_type,
        budget_eur_m,
        per_project_min,
        per_project_max,
        projects,
    })
}
