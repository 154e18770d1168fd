//! Quality report generation.
//!
//! The report is the structured record attached to a batch at evaluation
//! time: the composite score with its breakdown, duplicate statistics,
//! outlier findings, and summary statistics. Rejection evidence lives in
//! this data, not in log output; only the scalar score is stored durably on
//! the batch row.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::scorer::{self, ScoreBreakdown, DATE_FORMAT};
use crate::staging::StagedRow;

/// Day-over-day close change, in percent, beyond which a move is flagged.
const EXTREME_MOVE_PCT: f64 = 50.0;

/// Comprehensive quality report for one staged batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub batch_name: String,
    pub generated_at: DateTime<Utc>,
    pub row_count: usize,
    pub quality_score: f64,
    pub breakdown: ScoreBreakdown,
    pub duplicates: DuplicateStats,
    pub outliers: OutlierReport,
    pub summary: SummaryStats,
}

/// Duplicate (symbol, date) statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateStats {
    /// Rows belonging to a key group of size > 1.
    pub count: usize,
    pub percentage: f64,
}

/// Outlier findings across the staged rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierReport {
    pub negative_prices: Vec<OutlierRow>,
    pub extreme_moves: Vec<ExtremeMove>,
    pub zero_volumes: Vec<OutlierRow>,
}

impl OutlierReport {
    pub fn is_empty(&self) -> bool {
        self.negative_prices.is_empty()
            && self.extreme_moves.is_empty()
            && self.zero_volumes.is_empty()
    }
}

/// A flagged row, identified by its provenance and key fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierRow {
    pub row_number: i64,
    pub symbol: Option<String>,
    pub date: Option<String>,
    /// The offending field and its raw value.
    pub field: String,
    pub value: String,
}

/// A day-over-day close change beyond the extreme-move threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtremeMove {
    pub symbol: String,
    pub date: String,
    pub close: f64,
    pub previous_close: f64,
    pub pct_change: f64,
}

/// Summary statistics for the staged batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub unique_symbols: usize,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
}

/// Builds the full quality report for a batch of staged rows.
pub fn build_report(rows: &[StagedRow], batch_name: &str) -> QualityReport {
    let breakdown = scorer::breakdown(rows);
    let quality_score = if rows.is_empty() {
        0.0
    } else {
        breakdown.composite()
    };

    QualityReport {
        batch_name: batch_name.to_string(),
        generated_at: Utc::now(),
        row_count: rows.len(),
        quality_score,
        breakdown,
        duplicates: duplicate_stats(rows),
        outliers: find_outliers(rows),
        summary: summary_stats(rows),
    }
}

fn duplicate_stats(rows: &[StagedRow]) -> DuplicateStats {
    let count = scorer::duplicated_rows(rows);
    let percentage = if rows.is_empty() {
        0.0
    } else {
        count as f64 / rows.len() as f64 * 100.0
    };
    DuplicateStats { count, percentage }
}

fn summary_stats(rows: &[StagedRow]) -> SummaryStats {
    let symbols: HashSet<&str> = rows.iter().filter_map(|r| r.symbol.as_deref()).collect();
    let mut dates: Vec<&str> = rows.iter().filter_map(|r| r.date.as_deref()).collect();
    dates.sort_unstable();

    SummaryStats {
        unique_symbols: symbols.len(),
        min_date: dates.first().map(|d| d.to_string()),
        max_date: dates.last().map(|d| d.to_string()),
    }
}

fn find_outliers(rows: &[StagedRow]) -> OutlierReport {
    let mut report = OutlierReport::default();

    for row in rows {
        for (field, value) in price_fields(row) {
            if let Ok(price) = value.parse::<f64>() {
                if price < 0.0 {
                    report.negative_prices.push(OutlierRow {
                        row_number: row.row_number,
                        symbol: row.symbol.clone(),
                        date: row.date.clone(),
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        if let Some(volume) = row.volume.as_deref() {
            if volume.parse::<f64>().is_ok_and(|v| v == 0.0) {
                report.zero_volumes.push(OutlierRow {
                    row_number: row.row_number,
                    symbol: row.symbol.clone(),
                    date: row.date.clone(),
                    field: "volume".to_string(),
                    value: volume.to_string(),
                });
            }
        }
    }

    report.extreme_moves = find_extreme_moves(rows);
    report
}

fn price_fields(row: &StagedRow) -> impl Iterator<Item = (&'static str, &str)> {
    [
        ("open", row.open.as_deref()),
        ("high", row.high.as_deref()),
        ("low", row.low.as_deref()),
        ("close", row.close.as_deref()),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|v| (field, v)))
}

/// Flags day-over-day close changes beyond [`EXTREME_MOVE_PCT`], computed
/// per symbol in date order. Rows without a parseable symbol, date, and
/// close are skipped.
fn find_extreme_moves(rows: &[StagedRow]) -> Vec<ExtremeMove> {
    let mut by_symbol: BTreeMap<&str, Vec<(NaiveDate, &str, f64)>> = BTreeMap::new();

    for row in rows {
        let (Some(symbol), Some(date_str), Some(close_str)) = (
            row.symbol.as_deref(),
            row.date.as_deref(),
            row.close.as_deref(),
        ) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date_str, DATE_FORMAT) else {
            continue;
        };
        let Ok(close) = close_str.parse::<f64>() else {
            continue;
        };
        by_symbol
            .entry(symbol)
            .or_default()
            .push((date, date_str, close));
    }

    let mut moves = Vec::new();
    for (symbol, mut series) in by_symbol {
        series.sort_by_key(|(date, _, _)| *date);
        for window in series.windows(2) {
            let (_, _, previous_close) = window[0];
            let (_, date_str, close) = window[1];
            if previous_close == 0.0 {
                continue;
            }
            let pct_change = (close - previous_close) / previous_close * 100.0;
            if pct_change.abs() > EXTREME_MOVE_PCT {
                moves.push(ExtremeMove {
                    symbol: symbol.to_string(),
                    date: date_str.to_string(),
                    close,
                    previous_close,
                    pct_change,
                });
            }
        }
    }
    moves
}
