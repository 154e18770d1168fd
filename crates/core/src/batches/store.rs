//! Batch repository trait.

use async_trait::async_trait;

use super::model::{Batch, BatchStatus};
use crate::errors::Result;

/// Storage interface for batch audit records.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Persists a freshly opened batch.
    async fn create(&self, batch: Batch) -> Result<Batch>;

    /// Moves a batch to a terminal status, stamping the end time.
    ///
    /// `final_row_count` overwrites the declared row count when given and is
    /// left alone otherwise. The error message always reflects this
    /// finalization, including clearing it on success.
    async fn finalize(
        &self,
        batch_id: &str,
        status: BatchStatus,
        error_message: Option<String>,
        final_row_count: Option<i64>,
    ) -> Result<()>;

    fn get_by_id(&self, batch_id: &str) -> Result<Option<Batch>>;

    /// Most recent batches, newest first.
    fn list_recent(&self, limit: i64) -> Result<Vec<Batch>>;
}
