//! Batch lineage tracker service.

use std::sync::Arc;

use log::info;

use super::model::{Batch, BatchMeta, BatchStatus};
use super::store::BatchStore;
use crate::errors::Result;

/// Opens and finalizes batch audit records.
///
/// Contract: every load attempt yields exactly one batch row, finalized
/// exactly once; a process crash leaves the row running rather than
/// deleting it.
pub struct BatchTracker {
    store: Arc<dyn BatchStore>,
}

impl BatchTracker {
    pub fn new(store: Arc<dyn BatchStore>) -> Self {
        Self { store }
    }

    /// Opens a batch in the running state and persists it.
    pub async fn open(&self, meta: BatchMeta) -> Result<Batch> {
        let batch = Batch::open(meta);
        let batch = self.store.create(batch).await?;
        info!("opened batch '{}' with id {}", batch.batch_name, batch.id);
        Ok(batch)
    }

    /// Finalizes a batch to a terminal status.
    pub async fn finalize(
        &self,
        batch_id: &str,
        status: BatchStatus,
        error_message: Option<String>,
        final_row_count: Option<i64>,
    ) -> Result<()> {
        debug_assert!(status.is_terminal());
        self.store
            .finalize(batch_id, status, error_message, final_row_count)
            .await?;
        info!("finalized batch {batch_id} as {status}");
        Ok(())
    }

    pub fn get_by_id(&self, batch_id: &str) -> Result<Option<Batch>> {
        self.store.get_by_id(batch_id)
    }

    pub fn list_recent(&self, limit: i64) -> Result<Vec<Batch>> {
        self.store.list_recent(limit)
    }
}
