//! SQLite helpers.

use chrono::{DateTime, Utc};

/// Chunk size for `IN (...)` parameter lists.
///
/// SQLite caps the number of bound parameters per statement. 500 stays
/// safely under the historical 999 limit and leaves room for the other
/// binds a query may carry.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits a slice into chunks sized for SQLite parameter limits.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Rows per multi-row insert statement.
///
/// Multi-row inserts bind every column of every row; with the bundled
/// SQLite's higher parameter ceiling, 1000 rows per statement is the same
/// batch shape the quote sync path uses.
pub const INSERT_BATCH_ROWS: usize = 1_000;

/// Parses a stored RFC 3339 timestamp, falling back to now on garbage.
pub fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Formats a timestamp the way every table stores it.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_empty_input_yields_nothing() {
        let items: Vec<i32> = vec![];
        assert!(chunk_for_sqlite(&items).next().is_none());
    }

    #[test]
    fn chunking_splits_at_the_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[2].len(), 200);
    }
}
