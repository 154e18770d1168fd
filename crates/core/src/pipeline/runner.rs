//! Bulk loading across a bounded worker pool.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::service::{IngestPipeline, LoadRequest};
use crate::config::IngestConfig;
use crate::errors::Result;
use crate::gold::{RefreshCoordinator, RefreshTracker, DAILY_GOLD_VIEW};
use crate::prices::PriceStore;
use crate::sources::SourceService;
use crate::staging::infer_symbol_from_filename;

/// Statistics for one bulk run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Files skipped because their symbol was already loaded.
    pub skipped: usize,
    pub records_loaded: u64,
    pub refreshes: u64,
    /// Human-readable failure notes, one per failed file.
    pub errors: Vec<String>,
}

/// Runs many files through the pipeline with bounded parallelism.
///
/// Each file runs its own complete pipeline instance under its own stage
/// key, so files are independent. The runner owns the refresh batching
/// policy: a refresh fires whenever the tracker's threshold is reached and
/// once more, unconditionally, at the end of the run. All refreshes execute
/// on the coordinating task, which serializes them against the single
/// coordinator.
pub struct BulkRunner {
    config: IngestConfig,
    pipeline: Arc<IngestPipeline>,
    sources: Arc<SourceService>,
    prices: Arc<dyn PriceStore>,
    refresher: Arc<RefreshCoordinator>,
}

impl BulkRunner {
    pub fn new(
        config: IngestConfig,
        pipeline: Arc<IngestPipeline>,
        sources: Arc<SourceService>,
        prices: Arc<dyn PriceStore>,
        refresher: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            config,
            pipeline,
            sources,
            prices,
            refresher,
        }
    }

    /// Loads `files` from `source_name`, skipping symbols the source has
    /// already loaded when `skip_existing` is set.
    ///
    /// The skip-set is computed once before dispatch; recomputing it
    /// mid-run would race against concurrently-completing workers.
    pub async fn run(
        &self,
        files: Vec<PathBuf>,
        source_name: &str,
        skip_existing: bool,
    ) -> Result<RunSummary> {
        let source = self.sources.resolve_active(source_name)?;

        let loaded_symbols: HashSet<String> = if skip_existing {
            let symbols = self.prices.symbols_loaded_for_source(&source.id)?;
            info!(
                "{} symbols already loaded from {source_name}",
                symbols.len()
            );
            symbols
        } else {
            HashSet::new()
        };

        let mut summary = RunSummary {
            total_files: files.len(),
            ..Default::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut tracker = RefreshTracker::new(self.config.refresh_threshold);
        let mut workers = JoinSet::new();

        for file in files {
            let symbol = infer_symbol_from_filename(&file);
            if skip_existing && loaded_symbols.contains(&symbol) {
                summary.skipped += 1;
                continue;
            }

            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&semaphore);
            let request = LoadRequest::new(file.clone(), source_name);

            workers.spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("worker semaphore closed mid-run");
                let result = pipeline.load_file(&request).await;
                (file, result)
            });
        }

        while let Some(joined) = workers.join_next().await {
            let (file, result) = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!("worker panicked: {join_error}");
                    summary.failed += 1;
                    summary.errors.push(format!("worker panic: {join_error}"));
                    continue;
                }
            };

            match result {
                Ok(report) => {
                    summary.succeeded += 1;
                    let inserted = report
                        .outcome
                        .as_ref()
                        .map(|o| o.inserted as u64)
                        .unwrap_or(0);
                    summary.records_loaded += inserted;
                    tracker.record_inserted(inserted);

                    if tracker.should_refresh() {
                        info!(
                            "refreshing gold view after {} loaded rows",
                            tracker.total_inserted()
                        );
                        match self.refresher.refresh(DAILY_GOLD_VIEW, true).await {
                            Ok(()) => tracker.mark_refreshed(),
                            // A mid-run refresh failure is not fatal to the
                            // remaining loads; the final refresh retries.
                            Err(e) => warn!("mid-run gold refresh failed: {e}"),
                        }
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {e}", file.display()));
                    error!("failed to load {}: {e}", file.display());
                }
            }
        }

        // Final refresh regardless of the threshold, so the run never ends
        // with admitted data missing from the gold view.
        self.refresher.refresh(DAILY_GOLD_VIEW, true).await?;
        tracker.mark_refreshed();
        summary.refreshes = tracker.refreshes();

        info!(
            "bulk run complete: {} succeeded, {} failed, {} skipped, {} records",
            summary.succeeded, summary.failed, summary.skipped, summary.records_loaded
        );
        Ok(summary)
    }
}
