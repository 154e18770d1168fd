//! The idempotent price loader.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use super::model::{LoadOutcome, PriceRecord, RowOutcome};
use super::store::PriceStore;
use crate::config::IngestConfig;
use crate::errors::Result;
use crate::staging::StagedRow;

/// Validates staged rows and persists the survivors in chunks.
///
/// Each row is processed independently: a parse failure or OHLC violation
/// rejects that row alone, never the batch. Duplicate (asset, date) keys
/// within one call deduplicate keep-last through the upsert key - the later
/// row overwrites the earlier, mirroring a re-delivered file overwriting a
/// previous load.
pub struct PriceLoader {
    store: Arc<dyn PriceStore>,
    chunk_size: usize,
}

impl PriceLoader {
    pub fn new(store: Arc<dyn PriceStore>, config: &IngestConfig) -> Self {
        Self {
            store,
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Validates every staged row without touching storage.
    ///
    /// Exposed separately so callers can inspect rejection reasons (and
    /// tests can cover validation) independent of persistence.
    pub fn validate_rows(rows: &[StagedRow]) -> Vec<RowOutcome> {
        rows.iter().map(RowOutcome::from_staged).collect()
    }

    /// Inserts the valid subset of `rows` as facts owned by `asset_id`.
    ///
    /// Returns how many rows were actually persisted alongside the
    /// structured rejections. Statement-level persistence failures are
    /// counted and skipped; connection-level failures abort and propagate.
    pub async fn insert(
        &self,
        rows: &[StagedRow],
        asset_id: &str,
        batch_id: &str,
        source_id: &str,
    ) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::default();
        let mut accepted = Vec::with_capacity(rows.len());

        for row_outcome in Self::validate_rows(rows) {
            match row_outcome {
                RowOutcome::Accepted(validated) => accepted.push(validated),
                RowOutcome::Rejected(rejection) => {
                    warn!(
                        "skipping row {} for asset {asset_id}: {}",
                        rejection.row_number, rejection.reason
                    );
                    outcome.rejections.push(rejection);
                }
            }
        }

        if accepted.is_empty() {
            warn!(
                "no valid price rows for asset {asset_id} after validation ({} rejected)",
                outcome.rejections.len()
            );
            return Ok(outcome);
        }

        let created_at = Utc::now();
        let records: Vec<PriceRecord> = accepted
            .into_iter()
            .map(|row| PriceRecord::from_validated(row, asset_id, batch_id, source_id, created_at))
            .collect();

        for chunk in records.chunks(self.chunk_size) {
            let report = self.store.upsert_prices(chunk).await?;
            outcome.inserted += report.persisted;
            outcome.persist_failures += report.failed;
        }

        info!(
            "persisted {} price rows for asset {asset_id}, skipped {}",
            outcome.inserted,
            outcome.skipped()
        );
        Ok(outcome)
    }
}
