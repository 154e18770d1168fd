//! Composite quality scoring.
//!
//! Four sub-scores, 25 points each, averaged into a 0-100 composite:
//!
//! - **completeness** - fraction of non-null cells among the required
//!   fields (symbol, date, close)
//! - **validity** - fraction of rows whose present date parses as
//!   `YYYY-MM-DD` and whose present numeric fields parse as numbers
//! - **consistency** - fraction of rows satisfying the OHLC invariant,
//!   among rows that have all four prices present and parseable; rows
//!   missing price data are excluded from the denominator
//! - **uniqueness** - one minus the fraction of rows sharing a
//!   (symbol, date) key with at least one other row
//!
//! Empty input scores 0.0 overall: zero cells means zero completeness and
//! validity, not a perfect score. The uniqueness sub-score alone is
//! vacuously 100 on empty input - an asymmetry inherited deliberately and
//! pinned by tests rather than smoothed over.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::staging::StagedRow;

/// Date format accepted by the validity sub-score and the price loader.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields counted by the completeness sub-score.
const REQUIRED_FIELD_COUNT: usize = 3;

/// Per-dimension sub-scores, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub completeness: f64,
    pub validity: f64,
    pub consistency: f64,
    pub uniqueness: f64,
}

impl ScoreBreakdown {
    /// Equally-weighted composite of the four sub-scores.
    pub fn composite(&self) -> f64 {
        let total = (self.completeness + self.validity + self.consistency + self.uniqueness) / 4.0;
        (total * 100.0).round() / 100.0
    }
}

/// Computes the composite quality score for a set of staged rows.
///
/// Returns 0.0 exactly for empty input.
pub fn score(rows: &[StagedRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    breakdown(rows).composite()
}

/// Computes all four sub-scores.
///
/// Unlike [`score`], this does not short-circuit on empty input, so the
/// vacuous uniqueness convention is observable here.
pub fn breakdown(rows: &[StagedRow]) -> ScoreBreakdown {
    ScoreBreakdown {
        completeness: completeness(rows),
        validity: validity(rows),
        consistency: consistency(rows),
        uniqueness: uniqueness(rows),
    }
}

/// Fraction of non-null required cells (symbol, date, close), as 0-100.
fn completeness(rows: &[StagedRow]) -> f64 {
    let total_cells = rows.len() * REQUIRED_FIELD_COUNT;
    if total_cells == 0 {
        return 0.0;
    }

    let missing: usize = rows
        .iter()
        .map(|row| {
            [&row.symbol, &row.date, &row.close]
                .iter()
                .filter(|cell| cell.is_none())
                .count()
        })
        .sum();

    (total_cells - missing) as f64 / total_cells as f64 * 100.0
}

/// Fraction of rows whose present fields parse, as 0-100.
///
/// A null cell does not invalidate a row here; absence is completeness's
/// concern, not validity's.
fn validity(rows: &[StagedRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }

    let valid = rows.iter().filter(|row| row_is_valid(row)).count();
    valid as f64 / rows.len() as f64 * 100.0
}

fn row_is_valid(row: &StagedRow) -> bool {
    if let Some(date) = row.date.as_deref() {
        if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return false;
        }
    }

    let numeric_fields = [&row.open, &row.high, &row.low, &row.close, &row.volume];
    numeric_fields
        .iter()
        .filter_map(|field| field.as_deref())
        .all(|value| value.parse::<f64>().is_ok())
}

/// Fraction of price-complete rows satisfying the OHLC invariant, as 0-100.
///
/// Rows missing any of the four prices (or carrying an unparseable one) are
/// excluded from the denominator rather than counted against the score; a
/// zero denominator scores 0.
fn consistency(rows: &[StagedRow]) -> f64 {
    let mut complete_rows = 0usize;
    let mut consistent_rows = 0usize;

    for row in rows {
        let Some(prices) = parse_ohlc(row) else {
            continue;
        };
        complete_rows += 1;
        if ohlc_consistent(prices) {
            consistent_rows += 1;
        }
    }

    if complete_rows == 0 {
        return 0.0;
    }
    consistent_rows as f64 / complete_rows as f64 * 100.0
}

pub(crate) fn parse_ohlc(row: &StagedRow) -> Option<[f64; 4]> {
    let open = row.open.as_deref()?.parse::<f64>().ok()?;
    let high = row.high.as_deref()?.parse::<f64>().ok()?;
    let low = row.low.as_deref()?.parse::<f64>().ok()?;
    let close = row.close.as_deref()?.parse::<f64>().ok()?;
    Some([open, high, low, close])
}

/// The OHLC bar invariant: high bounds the bar from above, low from below,
/// and every price is strictly positive.
pub(crate) fn ohlc_consistent([open, high, low, close]: [f64; 4]) -> bool {
    high >= open.max(close)
        && low <= open.min(close)
        && high >= low
        && [open, high, low, close].iter().all(|p| *p > 0.0)
}

/// One minus the duplicated-row fraction by (symbol, date) key, as 0-100.
///
/// Every row in a duplicated group counts, not just the extras. Empty input
/// is vacuously 100.
fn uniqueness(rows: &[StagedRow]) -> f64 {
    if rows.is_empty() {
        return 100.0;
    }

    let duplicate_rows = duplicated_rows(rows);
    (rows.len() - duplicate_rows) as f64 / rows.len() as f64 * 100.0
}

/// Number of rows belonging to a (symbol, date) group of size > 1.
///
/// Null keys group together, matching duplicate detection over raw staged
/// data.
pub(crate) fn duplicated_rows(rows: &[StagedRow]) -> usize {
    let mut groups: HashMap<(Option<&str>, Option<&str>), usize> = HashMap::new();
    for row in rows {
        *groups
            .entry((row.symbol.as_deref(), row.date.as_deref()))
            .or_default() += 1;
    }
    groups.values().filter(|&&count| count > 1).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(row_number: i64, symbol: &str, date: &str, close: &str) -> StagedRow {
        StagedRow {
            row_number,
            symbol: Some(symbol.to_string()),
            date: Some(date.to_string()),
            open: Some("100.0".to_string()),
            high: Some("102.0".to_string()),
            low: Some("99.0".to_string()),
            close: Some(close.to_string()),
            volume: Some("1000000".to_string()),
            adjusted_close: Some("100.5".to_string()),
            source_file: "test.csv".to_string(),
        }
    }

    #[test]
    fn score_of_empty_input_is_zero() {
        assert_eq!(score(&[]), 0.0);
    }

    #[test]
    fn uniqueness_of_empty_input_is_vacuously_perfect() {
        // The documented asymmetry: the composite is 0 on empty input while
        // the uniqueness dimension alone reports 100.
        let b = breakdown(&[]);
        assert_eq!(b.completeness, 0.0);
        assert_eq!(b.validity, 0.0);
        assert_eq!(b.consistency, 0.0);
        assert_eq!(b.uniqueness, 100.0);
    }

    #[test]
    fn clean_unique_rows_score_high() {
        let rows: Vec<StagedRow> = (1..=5)
            .map(|i| full_row(i, "AAPL", &format!("2024-01-0{i}"), "101.0"))
            .collect();
        assert!(score(&rows) >= 90.0);
    }

    #[test]
    fn perfect_rows_score_exactly_100() {
        let rows = vec![
            full_row(1, "AAPL", "2024-01-02", "101.0"),
            full_row(2, "AAPL", "2024-01-03", "101.5"),
        ];
        assert_eq!(score(&rows), 100.0);
    }

    #[test]
    fn inconsistent_ohlc_lowers_only_consistency() {
        let mut bad = full_row(2, "AAPL", "2024-01-03", "101.0");
        // High below both open and close, low above both.
        bad.high = Some("90.0".to_string());
        bad.low = Some("110.0".to_string());

        let rows = vec![full_row(1, "AAPL", "2024-01-02", "101.0"), bad];
        let b = breakdown(&rows);
        assert_eq!(b.completeness, 100.0);
        assert_eq!(b.validity, 100.0);
        assert_eq!(b.consistency, 50.0);
        assert_eq!(b.uniqueness, 100.0);
    }

    #[test]
    fn rows_missing_prices_do_not_drag_consistency_down() {
        let mut sparse = full_row(2, "AAPL", "2024-01-03", "101.0");
        sparse.open = None;
        sparse.high = None;

        let rows = vec![full_row(1, "AAPL", "2024-01-02", "101.0"), sparse];
        // Only the complete row enters the denominator.
        assert_eq!(breakdown(&rows).consistency, 100.0);
    }

    #[test]
    fn all_rows_in_a_duplicate_group_count_against_uniqueness() {
        let rows = vec![
            full_row(1, "AAPL", "2024-01-02", "101.0"),
            full_row(2, "AAPL", "2024-01-02", "102.0"),
            full_row(3, "AAPL", "2024-01-03", "103.0"),
            full_row(4, "AAPL", "2024-01-04", "104.0"),
        ];
        // Two of four rows share a key.
        assert_eq!(breakdown(&rows).uniqueness, 50.0);
    }

    #[test]
    fn missing_cells_lower_completeness_not_validity() {
        let mut sparse = full_row(1, "AAPL", "2024-01-02", "101.0");
        sparse.date = None;

        let b = breakdown(&[sparse]);
        assert!((b.completeness - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(b.validity, 100.0);
    }

    #[test]
    fn garbage_numbers_fail_validity() {
        let mut bad = full_row(1, "AAPL", "2024-01-02", "101.0");
        bad.volume = Some("a lot".to_string());
        assert_eq!(breakdown(&[bad]).validity, 0.0);
    }

    #[test]
    fn non_positive_prices_are_inconsistent() {
        let mut bad = full_row(1, "AAPL", "2024-01-02", "101.0");
        bad.open = Some("-1.0".to_string());
        bad.low = Some("-2.0".to_string());
        assert_eq!(breakdown(&[bad]).consistency, 0.0);
    }
}
