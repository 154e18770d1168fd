//! Column normalization for incoming price files.
//!
//! Input files arrive with heterogeneous headers ("Date", "trade_date",
//! "Adj Close", ...). Each canonical field is resolved through a static
//! alias table, case-insensitively, first match wins. A missing symbol
//! column is inferred from the filename; anything else unresolved becomes a
//! null cell rather than an error.

use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, info, warn};
use regex::Regex;

use super::model::StagedRow;
use crate::errors::{Result, StructuralError};

/// Canonical fields a staged row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CanonicalField {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    AdjustedClose,
    Symbol,
}

/// Accepted header aliases per canonical field, matched case-insensitively
/// in order. The first header that equals an alias wins for that field.
const FIELD_ALIASES: [(CanonicalField, &[&str]); 8] = [
    (CanonicalField::Date, &["date", "trade_date", "timestamp", "day"]),
    (CanonicalField::Open, &["open", "open_price"]),
    (CanonicalField::High, &["high", "high_price"]),
    (CanonicalField::Low, &["low", "low_price"]),
    (CanonicalField::Close, &["close", "close_price", "last"]),
    (CanonicalField::Volume, &["volume", "vol"]),
    (
        CanonicalField::AdjustedClose,
        &["adj close", "adj_close", "adjclose", "adjusted_close"],
    ),
    (CanonicalField::Symbol, &["symbol", "ticker"]),
];

/// Result of normalizing one file.
#[derive(Debug, Clone)]
pub struct NormalizedFile {
    pub rows: Vec<StagedRow>,
    /// Symbol inferred from the filename when no symbol column resolved.
    pub inferred_symbol: Option<String>,
}

impl NormalizedFile {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parses one delimited file into canonical staged rows.
///
/// Fails with a [`StructuralError`] if the file is missing, unreadable, or
/// contains no data rows. Unresolvable columns and empty cells become null
/// fields on the affected rows.
pub fn normalize_file(path: &Path) -> Result<NormalizedFile> {
    let display_path = path.display().to_string();

    if !path.exists() {
        return Err(StructuralError::FileNotFound(display_path).into());
    }

    let content = std::fs::read(path)
        .map_err(|e| StructuralError::Unreadable(format!("{display_path}: {e}")))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StructuralError::MissingHeader(format!("{display_path}: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(StructuralError::MissingHeader(display_path).into());
    }

    let columns = resolve_columns(&headers);

    // Symbol falls back to the filename when no header matched.
    let inferred_symbol = if columns.symbol.is_none() {
        let symbol = infer_symbol_from_filename(path);
        info!("no symbol column in {display_path}, inferred '{symbol}' from filename");
        Some(symbol)
    } else {
        None
    };

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping unreadable record {} in {display_path}: {e}", index + 1);
                continue;
            }
        };

        let cell = |column: Option<usize>| -> Option<String> {
            column
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        rows.push(StagedRow {
            row_number: (index + 1) as i64,
            symbol: cell(columns.symbol).or_else(|| inferred_symbol.clone()),
            date: cell(columns.date),
            open: cell(columns.open),
            high: cell(columns.high),
            low: cell(columns.low),
            close: cell(columns.close),
            volume: cell(columns.volume),
            adjusted_close: cell(columns.adjusted_close),
            source_file: display_path.clone(),
        });
    }

    if rows.is_empty() {
        return Err(StructuralError::EmptyInput(display_path).into());
    }

    debug!("normalized {} rows from {display_path}", rows.len());
    Ok(NormalizedFile {
        rows,
        inferred_symbol,
    })
}

/// Resolved header index per canonical field.
#[derive(Debug, Default)]
struct ColumnMap {
    date: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
    adjusted_close: Option<usize>,
    symbol: Option<usize>,
}

fn resolve_columns(headers: &[String]) -> ColumnMap {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let mut map = ColumnMap::default();

    for (field, aliases) in FIELD_ALIASES {
        let position = aliases
            .iter()
            .find_map(|alias| lowered.iter().position(|h| h == alias));
        let slot = match field {
            CanonicalField::Date => &mut map.date,
            CanonicalField::Open => &mut map.open,
            CanonicalField::High => &mut map.high,
            CanonicalField::Low => &mut map.low,
            CanonicalField::Close => &mut map.close,
            CanonicalField::Volume => &mut map.volume,
            CanonicalField::AdjustedClose => &mut map.adjusted_close,
            CanonicalField::Symbol => &mut map.symbol,
        };
        *slot = position;
    }

    map
}

/// Extracts a plausible ticker symbol from a filename.
///
/// Tries, in order: a leading run of 1-5 uppercase letters, such a run
/// before `_` or `-`, then uppercase letters and dashes anywhere (crypto
/// pairs like BTC-USD). Falls back to the filename stripped to uppercase
/// letters and dashes, or `UNKNOWN`.
pub fn infer_symbol_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_uppercase();

    let patterns = [
        r"^([A-Z]{1,5})",
        r"([A-Z]{1,5})_",
        r"([A-Z]{1,5})-",
        r"([A-Z-]{1,10})",
    ];

    for pattern in patterns {
        // The patterns are fixed literals; compilation cannot fail.
        let re = Regex::new(pattern).expect("invalid symbol pattern");
        if let Some(captures) = re.captures(&stem) {
            if let Some(matched) = captures.get(1) {
                return matched.as_str().to_string();
            }
        }
    }

    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_uppercase() || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "UNKNOWN".to_string()
    } else {
        cleaned
    }
}
