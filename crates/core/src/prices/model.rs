//! Price fact domain models and per-row validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::staging::StagedRow;

/// Date format a price row must use. One canonical format, parsed strictly.
pub const PRICE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Time resolution of a price fact.
///
/// Daily bars are the only granularity this pipeline ingests; the tag still
/// participates in the upsert key so finer resolutions can coexist later
/// without reshaping the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    #[default]
    Daily,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "DAILY",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DAILY" => Ok(Granularity::Daily),
            other => Err(Error::Validation(
                crate::errors::ValidationError::InvalidInput(format!(
                    "unknown granularity '{other}'"
                )),
            )),
        }
    }
}

/// A staged row that passed parsing and the OHLC invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedPriceRow {
    pub price_date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Option<i64>,
    pub adjusted_close: Option<Decimal>,
}

impl ValidatedPriceRow {
    /// Parses and validates one staged row.
    ///
    /// The five required fields (date and the four prices) parse strictly;
    /// volume and adjusted close parse best-effort and fall back to `None`.
    /// The OHLC invariant is enforced last.
    pub fn try_from_staged(row: &StagedRow) -> std::result::Result<Self, RejectReason> {
        let date_str = row
            .date
            .as_deref()
            .ok_or(RejectReason::MissingField("date"))?;
        let price_date = NaiveDate::parse_from_str(date_str, PRICE_DATE_FORMAT)
            .map_err(|_| RejectReason::UnparsableDate(date_str.to_string()))?;

        let open = parse_price("open", &row.open)?;
        let high = parse_price("high", &row.high)?;
        let low = parse_price("low", &row.low)?;
        let close = parse_price("close", &row.close)?;

        // Best-effort fields: a bad value becomes null, never a rejection.
        let volume = row
            .volume
            .as_deref()
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v.trunc() as i64);
        let adjusted_close = row
            .adjusted_close
            .as_deref()
            .and_then(|v| Decimal::from_str(v).ok());

        let validated = Self {
            price_date,
            open,
            high,
            low,
            close,
            volume,
            adjusted_close,
        };

        if !validated.ohlc_consistent() {
            return Err(RejectReason::OhlcViolation);
        }
        Ok(validated)
    }

    /// The OHLC bar invariant: high bounds the bar from above, low from
    /// below, and all four prices are strictly positive.
    pub fn ohlc_consistent(&self) -> bool {
        self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.high >= self.low
            && [self.open, self.high, self.low, self.close]
                .iter()
                .all(|p| p.is_sign_positive() && !p.is_zero())
    }
}

fn parse_price(
    field: &'static str,
    value: &Option<String>,
) -> std::result::Result<Decimal, RejectReason> {
    let raw = value.as_deref().ok_or(RejectReason::MissingField(field))?;
    Decimal::from_str(raw).map_err(|_| RejectReason::UnparsablePrice {
        field,
        value: raw.to_string(),
    })
}

/// Why a row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    MissingField(&'static str),
    UnparsableDate(String),
    UnparsablePrice { field: &'static str, value: String },
    OhlcViolation,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingField(field) => write!(f, "required field '{field}' is missing"),
            RejectReason::UnparsableDate(value) => write!(f, "cannot parse date '{value}'"),
            RejectReason::UnparsablePrice { field, value } => {
                write!(f, "cannot parse {field} price '{value}'")
            }
            RejectReason::OhlcViolation => write!(f, "OHLC invariant violated"),
        }
    }
}

/// A rejected row with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub row_number: i64,
    pub reason: RejectReason,
}

/// Outcome of validating one staged row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(ValidatedPriceRow),
    Rejected(Rejection),
}

impl RowOutcome {
    pub fn from_staged(row: &StagedRow) -> Self {
        match ValidatedPriceRow::try_from_staged(row) {
            Ok(validated) => RowOutcome::Accepted(validated),
            Err(reason) => RowOutcome::Rejected(Rejection {
                row_number: row.row_number,
                reason,
            }),
        }
    }
}

/// A price fact ready for persistence, carrying its full lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub asset_id: String,
    pub batch_id: String,
    pub source_id: String,
    pub price_date: NaiveDate,
    pub granularity: Granularity,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Option<i64>,
    pub adjusted_close: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl PriceRecord {
    pub fn from_validated(
        row: ValidatedPriceRow,
        asset_id: &str,
        batch_id: &str,
        source_id: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            batch_id: batch_id.to_string(),
            source_id: source_id.to_string(),
            price_date: row.price_date,
            granularity: Granularity::Daily,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            adjusted_close: row.adjusted_close,
            created_at,
        }
    }
}

/// Result of one loader invocation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    /// Rows actually persisted.
    pub inserted: usize,
    /// Structured reasons for every row rejected during validation.
    pub rejections: Vec<Rejection>,
    /// Rows that validated but failed to persist at the statement level.
    pub persist_failures: usize,
}

impl LoadOutcome {
    /// Total rows that did not make it into the warehouse.
    pub fn skipped(&self) -> usize {
        self.rejections.len() + self.persist_failures
    }

    /// Whether every submitted row was persisted.
    pub fn is_clean(&self) -> bool {
        self.skipped() == 0
    }
}
