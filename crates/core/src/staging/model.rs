//! Staged row model and staging diagnostics.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One input row after column-name normalization.
///
/// All value fields are kept as raw strings; parsing happens later in the
/// price loader so that a malformed cell degrades the quality score instead
/// of aborting staging. `None` means the cell was absent or empty, or the
/// whole column could not be resolved from the file's headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedRow {
    /// 1-based position within the source file (excluding the header).
    pub row_number: i64,
    pub symbol: Option<String>,
    pub date: Option<String>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
    pub adjusted_close: Option<String>,
    /// Path of the file this row came from.
    pub source_file: String,
}

/// Aggregate view of a staged file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingSummary {
    pub row_count: usize,
    pub symbol_count: usize,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
}

/// Advisory findings from inspecting staged rows before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingIssue {
    MissingSymbols(usize),
    MissingDates(usize),
    MissingCloses(usize),
    InvalidDateFormat(usize),
    NonNumericPrices { field: &'static str, rows: usize },
    DuplicateKeys(usize),
}

impl fmt::Display for StagingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingIssue::MissingSymbols(n) => write!(f, "{n} rows with missing symbol"),
            StagingIssue::MissingDates(n) => write!(f, "{n} rows with missing date"),
            StagingIssue::MissingCloses(n) => write!(f, "{n} rows with missing close price"),
            StagingIssue::InvalidDateFormat(n) => {
                write!(f, "{n} rows with unrecognized date format")
            }
            StagingIssue::NonNumericPrices { field, rows } => {
                write!(f, "{rows} rows with non-numeric {field}")
            }
            StagingIssue::DuplicateKeys(n) => {
                write!(f, "{n} duplicate symbol-date combinations")
            }
        }
    }
}

/// Computes summary statistics over staged rows.
pub fn summarize(rows: &[StagedRow]) -> StagingSummary {
    let symbols: HashSet<&str> = rows
        .iter()
        .filter_map(|r| r.symbol.as_deref())
        .collect();
    let mut dates: Vec<&str> = rows.iter().filter_map(|r| r.date.as_deref()).collect();
    dates.sort_unstable();

    StagingSummary {
        row_count: rows.len(),
        symbol_count: symbols.len(),
        min_date: dates.first().map(|d| d.to_string()),
        max_date: dates.last().map(|d| d.to_string()),
    }
}

/// Inspects staged rows and reports advisory data issues.
///
/// None of these findings block a load on their own; the quality gate makes
/// that call from the composite score.
pub fn inspect(rows: &[StagedRow]) -> Vec<StagingIssue> {
    let mut issues = Vec::new();

    let missing_symbols = rows.iter().filter(|r| r.symbol.is_none()).count();
    if missing_symbols > 0 {
        issues.push(StagingIssue::MissingSymbols(missing_symbols));
    }
    let missing_dates = rows.iter().filter(|r| r.date.is_none()).count();
    if missing_dates > 0 {
        issues.push(StagingIssue::MissingDates(missing_dates));
    }
    let missing_closes = rows.iter().filter(|r| r.close.is_none()).count();
    if missing_closes > 0 {
        issues.push(StagingIssue::MissingCloses(missing_closes));
    }

    let bad_dates = rows
        .iter()
        .filter_map(|r| r.date.as_deref())
        .filter(|d| !parses_as_known_date(d))
        .count();
    if bad_dates > 0 {
        issues.push(StagingIssue::InvalidDateFormat(bad_dates));
    }

    for (field, accessor) in PRICE_FIELDS {
        let bad = rows
            .iter()
            .filter_map(|r| accessor(r).as_deref())
            .filter(|v| v.parse::<f64>().is_err())
            .count();
        if bad > 0 {
            issues.push(StagingIssue::NonNumericPrices { field, rows: bad });
        }
    }

    let duplicates = duplicate_key_count(rows);
    if duplicates > 0 {
        issues.push(StagingIssue::DuplicateKeys(duplicates));
    }

    issues
}

type PriceAccessor = fn(&StagedRow) -> &Option<String>;

const PRICE_FIELDS: [(&str, PriceAccessor); 4] = [
    ("open", |r: &StagedRow| &r.open),
    ("high", |r: &StagedRow| &r.high),
    ("low", |r: &StagedRow| &r.low),
    ("close", |r: &StagedRow| &r.close),
];

/// Number of (symbol, date) keys appearing on more than one row.
fn duplicate_key_count(rows: &[StagedRow]) -> usize {
    let mut groups: HashMap<(&str, &str), usize> = HashMap::new();
    for row in rows {
        if let (Some(symbol), Some(date)) = (row.symbol.as_deref(), row.date.as_deref()) {
            *groups.entry((symbol, date)).or_default() += 1;
        }
    }
    groups.values().filter(|&&count| count > 1).count()
}

fn parses_as_known_date(value: &str) -> bool {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];
    FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}
