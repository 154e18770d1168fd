//! Staging area service.

use std::path::Path;
use std::sync::Arc;

use log::info;

use super::model::StagedRow;
use super::normalizer::normalize_file;
use super::store::StagingStore;
use crate::errors::Result;

/// Stages one input file's rows under a per-attempt key.
///
/// The write protocol is purge-then-write in two transactions: the purge
/// commits on its own before the bulk append starts. A stage key therefore
/// never holds rows from two files at once, and a crashed append leaves an
/// empty key, not a partial mix.
pub struct StagingArea {
    store: Arc<dyn StagingStore>,
}

impl StagingArea {
    pub fn new(store: Arc<dyn StagingStore>) -> Self {
        Self { store }
    }

    /// Normalizes `path` and stages its rows under `stage_key`.
    ///
    /// Structural failures (missing file, empty input) propagate before any
    /// write happens. Returns the number of rows staged.
    pub async fn stage_file(&self, path: &Path, stage_key: &str) -> Result<usize> {
        let normalized = normalize_file(path)?;

        let purged = self.store.purge(stage_key).await?;
        if purged > 0 {
            info!("purged {purged} leftover rows from stage '{stage_key}'");
        }

        let written = self.store.append_rows(stage_key, &normalized.rows).await?;
        info!(
            "staged {written} rows from {} under '{stage_key}'",
            path.display()
        );
        Ok(written)
    }

    /// Reads the staged rows back for scoring and loading.
    pub fn staged_rows(&self, stage_key: &str) -> Result<Vec<StagedRow>> {
        self.store.fetch(stage_key)
    }
}
