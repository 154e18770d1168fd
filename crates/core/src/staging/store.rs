//! Staging storage trait.

use async_trait::async_trait;

use super::model::StagedRow;
use crate::errors::Result;

/// Storage interface for the staging working area.
///
/// Rows live under a `stage_key` - one key per load attempt - so that
/// concurrent loads never see each other's rows. Purge and append run as
/// separate write transactions (two-phase), matching the load protocol:
/// a failed append leaves an already-purged, empty key behind, never a mix
/// of two files.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Deletes every staged row under the key, in its own transaction.
    ///
    /// Returns the number of rows removed.
    async fn purge(&self, stage_key: &str) -> Result<usize>;

    /// Bulk-appends rows under the key.
    ///
    /// Returns the number of rows written.
    async fn append_rows(&self, stage_key: &str, rows: &[StagedRow]) -> Result<usize>;

    /// Reads back all rows staged under the key, ordered by row number.
    fn fetch(&self, stage_key: &str) -> Result<Vec<StagedRow>>;
}
