//! Roster CSV import/export and the immutable roster snapshot handed to views.
//!
//! Import reads nine positional columns:
//! name, email, class, attendance, score 1-3, fee status, last contact.
//! Export writes eight:
//! name, email, class, attendance%, average score%, fee status, risk level, last contact.
//!
//! Fields are split on every comma. Quoting and escaping are not supported, so
//! a name such as `Lee, Avery` shifts the remaining columns of its row.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, RosterError};
use crate::models::{FeeStatus, RiskStats, RiskTier, StudentMetrics, StudentRecord};
use crate::risk::{rounded_average, RiskClassifier};

pub const IMPORT_HEADER: &str =
    "Name,Email,Class,Attendance,Test Score 1,Test Score 2,Test Score 3,Fee Status,Last Contact";
pub const EXPORT_HEADER: &str =
    "Name,Email,Class,Attendance,Average Score,Fee Status,Risk Level,Last Contact";

const DEFAULT_ATTENDANCE: i64 = 75;
const DEFAULT_SCORE: i64 = 70;
const DEFAULT_CLASS: &str = "Grade 10A";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Import,
    Export,
}

impl Layout {
    fn detect(header: &[&str]) -> Self {
        let named = |index: usize, name: &str| {
            header
                .get(index)
                .is_some_and(|cell| cell.eq_ignore_ascii_case(name))
        };
        if named(4, "average score") && named(6, "risk level") {
            Layout::Export
        } else {
            Layout::Import
        }
    }
}

/// Turns roster text into classified records. The current date is injected so
/// decoding stays deterministic.
#[derive(Debug, Clone, Copy)]
pub struct RosterCodec {
    classifier: RiskClassifier,
    today: NaiveDate,
}

impl RosterCodec {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            classifier: RiskClassifier::default(),
            today,
        }
    }

    pub fn with_classifier(mut self, classifier: RiskClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// `None` means the caller could not read the input at all.
    pub fn decode(&self, input: Option<&str>) -> Result<Vec<StudentRecord>> {
        let text = input.ok_or(RosterError::Unreadable)?;
        let body = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());
        let mut rows = reader.records();

        let Some(header) = rows.next().transpose()? else {
            return Ok(Vec::new());
        };
        let layout = Layout::detect(&header.iter().collect::<Vec<_>>());

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            let row = row?;
            let cells: Vec<&str> = row.iter().collect();
            records.push(self.decode_row(index + 1, &cells, layout));
        }

        info!(count = records.len(), ?layout, "decoded roster");
        Ok(records)
    }

    fn decode_row(&self, position: usize, cells: &[&str], layout: Layout) -> StudentRecord {
        let attendance = number_or(cells, 3, DEFAULT_ATTENDANCE, position);

        let (test_scores, fee_column, stated_tier, contact_column) = match layout {
            Layout::Import => {
                let scores: Vec<i64> = (4..=6)
                    .map(|column| number_or(cells, column, DEFAULT_SCORE, position))
                    .collect();
                (scores, 7, None, 8)
            }
            Layout::Export => {
                let scores: Vec<i64> = cell(cells, 4).and_then(leading_int).into_iter().collect();
                let tier = cell(cells, 6).and_then(|value| value.parse::<RiskTier>().ok());
                (scores, 5, tier, 7)
            }
        };

        let metrics = StudentMetrics {
            attendance_percent: attendance,
            test_scores,
            fee_status: fee_status(cell(cells, fee_column), position),
        };
        let assessment = self.classifier.classify(&metrics);

        StudentRecord {
            id: format!("csv{position}"),
            name: cell(cells, 0)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Student {position}")),
            email: cell(cells, 1)
                .map(str::to_string)
                .unwrap_or_else(|| format!("student{position}@school.edu")),
            class: cell(cells, 2).unwrap_or(DEFAULT_CLASS).to_string(),
            last_contact: self.contact_date(cell(cells, contact_column), position),
            metrics,
            risk_level: stated_tier.unwrap_or(assessment.tier),
            reasons: assessment.reasons,
        }
    }

    fn contact_date(&self, value: Option<&str>, position: usize) -> NaiveDate {
        match value {
            Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT).unwrap_or_else(|_| {
                debug!(row = position, value = text, "unparseable last contact, using today");
                self.today
            }),
            None => self.today,
        }
    }
}

pub fn decode(input: Option<&str>, today: NaiveDate) -> Result<Vec<StudentRecord>> {
    RosterCodec::new(today).decode(input)
}

pub fn encode(records: &[StudentRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER.split(','))?;
    for record in records {
        let average = rounded_average(&record.metrics.test_scores)
            .map(|avg| format!("{avg}%"))
            .unwrap_or_default();
        writer.write_record([
            record.name.clone(),
            record.email.clone(),
            record.class.clone(),
            format!("{}%", record.metrics.attendance_percent),
            average,
            record.metrics.fee_status.to_string(),
            record.risk_level.to_string(),
            record.last_contact.format(DATE_FORMAT).to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| RosterError::Csv(err.into_error().into()))?;
    let text = String::from_utf8_lossy(&bytes);
    info!(count = records.len(), "encoded roster");
    Ok(text.trim_end_matches('\n').to_string())
}

pub fn read_roster(path: &Path, today: NaiveDate, classifier: RiskClassifier) -> Result<Roster> {
    let text = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = RosterCodec::new(today)
        .with_classifier(classifier)
        .decode(Some(text.as_str()))?;
    Ok(Roster::new(records))
}

/// The downloadable import template.
pub fn template_csv() -> String {
    [
        IMPORT_HEADER,
        "John Doe,john.doe@school.edu,Grade 10A,85,78,82,79,paid,2024-01-25",
        "Jane Smith,jane.smith@school.edu,Grade 10B,72,65,68,71,pending,2024-01-23",
        "Mike Johnson,mike.j@school.edu,Grade 10A,91,88,92,87,paid,2024-01-27",
    ]
    .join("\n")
}

/// Demonstration roster, classified the same way as an upload.
pub fn sample_records(classifier: &RiskClassifier) -> Vec<StudentRecord> {
    let rows = [
        ("Emma Rodriguez", "emma.r@school.edu", "Grade 11A", 94, [89, 92, 87], FeeStatus::Paid, (2024, 1, 28)),
        ("Michael Chen", "michael.c@school.edu", "Grade 11A", 82, [72, 64, 68], FeeStatus::Pending, (2024, 1, 26)),
        ("Sarah Johnson", "sarah.j@school.edu", "Grade 11B", 58, [52, 47, 55], FeeStatus::Overdue, (2024, 1, 22)),
    ];

    rows.into_iter()
        .enumerate()
        .filter_map(|(index, (name, email, class, attendance, scores, fee, (y, m, d)))| {
            let metrics = StudentMetrics {
                attendance_percent: attendance,
                test_scores: scores.to_vec(),
                fee_status: fee,
            };
            let assessment = classifier.classify(&metrics);
            Some(StudentRecord {
                id: format!("csv{}", index + 1),
                name: name.to_string(),
                email: email.to_string(),
                class: class.to_string(),
                last_contact: NaiveDate::from_ymd_opt(y, m, d)?,
                metrics,
                risk_level: assessment.tier,
                reasons: assessment.reasons,
            })
        })
        .collect()
}

fn cell<'a>(cells: &[&'a str], index: usize) -> Option<&'a str> {
    cells.get(index).copied().filter(|value| !value.is_empty())
}

fn number_or(cells: &[&str], index: usize, default: i64, position: usize) -> i64 {
    match cell(cells, index).and_then(leading_int) {
        Some(value) => value,
        None => {
            debug!(row = position, column = index, default, "missing or non-numeric cell");
            default
        }
    }
}

/// Reads an optional sign and the digits that follow, ignoring any suffix
/// such as `%`. Returns `None` when no digit leads the cell.
fn leading_int(value: &str) -> Option<i64> {
    let (sign, rest) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<i64>().ok().map(|number| sign * number)
}

fn fee_status(value: Option<&str>, position: usize) -> FeeStatus {
    let Some(text) = value else {
        return FeeStatus::Paid;
    };
    text.parse().unwrap_or_else(|_| {
        debug!(row = position, value = text, "unrecognized fee status, treating as paid");
        FeeStatus::Paid
    })
}

#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
    pub search: Option<String>,
    pub class: Option<String>,
    pub tier: Option<RiskTier>,
}

impl RosterFilter {
    pub fn matches(&self, record: &StudentRecord) -> bool {
        let matches_search = self.search.as_deref().map_or(true, |term| {
            let term = term.to_lowercase();
            record.name.to_lowercase().contains(&term) || record.email.to_lowercase().contains(&term)
        });
        let matches_class = self
            .class
            .as_deref()
            .map_or(true, |class| record.class == class);
        let matches_tier = self.tier.map_or(true, |tier| record.risk_level == tier);
        matches_search && matches_class && matches_tier
    }
}

/// A roster as loaded by one import. Never edited in place; loading new data
/// produces a new snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    records: Vec<StudentRecord>,
}

impl Roster {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn stats(&self) -> RiskStats {
        self.records
            .iter()
            .fold(RiskStats::default(), |mut stats, record| {
                match record.risk_level {
                    RiskTier::High => stats.high += 1,
                    RiskTier::Moderate => stats.moderate += 1,
                    RiskTier::Low => stats.low += 1,
                }
                stats
            })
    }

    /// Distinct classes in the order they first appear.
    pub fn classes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.class.as_str())
            .filter(|class| seen.insert(*class))
            .collect()
    }

    pub fn filter(&self, filter: &RosterFilter) -> Vec<&StudentRecord> {
        self.records
            .iter()
            .filter(|record| filter.matches(record))
            .collect()
    }
}
