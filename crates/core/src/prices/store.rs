//! Price fact storage trait.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::model::PriceRecord;
use crate::errors::Result;

/// Per-chunk persistence report.
///
/// Statement-level failures are counted here instead of raised so a single
/// bad row never takes the batch down; connection-level failures come back
/// as errors from [`PriceStore::upsert_prices`] itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertReport {
    pub persisted: usize,
    pub failed: usize,
}

/// Storage interface for price facts.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Upserts records on the (asset, price date, source, granularity) key.
    ///
    /// On conflict every value field plus batch id and created-at is
    /// overwritten with the new record's values - last write wins.
    async fn upsert_prices(&self, records: &[PriceRecord]) -> Result<UpsertReport>;

    /// Number of stored facts for an asset.
    fn count_for_asset(&self, asset_id: &str) -> Result<i64>;

    /// Facts for an asset within an inclusive date range, oldest first.
    fn range(&self, asset_id: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<PriceRecord>>;

    /// Symbols that already have facts from the given source.
    ///
    /// Bulk runs compute this skip-set once per dispatch; recomputing it
    /// mid-run races against concurrently-completing workers.
    fn symbols_loaded_for_source(&self, source_id: &str) -> Result<HashSet<String>>;

    /// Timestamp of the most recently written fact, if any.
    fn latest_fact_created_at(&self) -> Result<Option<DateTime<Utc>>>;
}
