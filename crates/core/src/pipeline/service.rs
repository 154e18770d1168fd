//! Single-file ingestion pipeline.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use crate::assets::{AssetService, AssetType, NewAsset};
use crate::batches::{BatchMeta, BatchStatus, BatchTracker};
use crate::config::IngestConfig;
use crate::errors::{Error, Result};
use crate::prices::{LoadOutcome, PriceLoader};
use crate::quality::{self, QualityReport};
use crate::sources::SourceService;
use crate::staging::{self, StagedRow, StagingArea};

/// Parameters for loading one input file.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub file_path: PathBuf,
    pub source_name: String,
    /// Overrides symbol detection from the staged rows.
    pub symbol_override: Option<String>,
    pub asset_type: AssetType,
    pub exchange: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    /// Stage and score only; nothing is persisted past the staging area.
    pub dry_run: bool,
}

impl LoadRequest {
    pub fn new(file_path: impl Into<PathBuf>, source_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            source_name: source_name.into(),
            symbol_override: None,
            asset_type: AssetType::Stock,
            exchange: None,
            company_name: None,
            sector: None,
            dry_run: false,
        }
    }
}

/// What one load attempt produced.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Absent for dry runs, present for every attempt that reached the gate.
    pub batch_id: Option<String>,
    pub symbol: String,
    pub staged_rows: usize,
    pub quality: QualityReport,
    /// Absent when the gate rejected the batch or the run was dry.
    pub outcome: Option<LoadOutcome>,
}

/// Orchestrates one load attempt end-to-end.
///
/// Every collaborator is injected; the pipeline holds no global state and
/// two pipelines over the same stores may run concurrently as long as each
/// attempt uses its own stage key (which [`IngestPipeline::load_file`]
/// guarantees by deriving the key from the batch name).
pub struct IngestPipeline {
    config: IngestConfig,
    staging: Arc<StagingArea>,
    sources: Arc<SourceService>,
    assets: Arc<AssetService>,
    batches: Arc<BatchTracker>,
    loader: Arc<PriceLoader>,
}

impl IngestPipeline {
    pub fn new(
        config: IngestConfig,
        staging: Arc<StagingArea>,
        sources: Arc<SourceService>,
        assets: Arc<AssetService>,
        batches: Arc<BatchTracker>,
        loader: Arc<PriceLoader>,
    ) -> Self {
        Self {
            config,
            staging,
            sources,
            assets,
            batches,
            loader,
        }
    }

    /// Loads one file into the warehouse.
    ///
    /// Structural failures propagate before any batch row exists. Once the
    /// gate is reached, every path leaves a finalized batch row behind:
    /// FAILED on gate rejection or persistence failure, PARTIAL when some
    /// rows were skipped, SUCCESS otherwise.
    pub async fn load_file(&self, request: &LoadRequest) -> Result<LoadReport> {
        let path = request.file_path.as_path();
        info!("loading {}", path.display());

        let file_size = std::fs::metadata(path).ok().map(|m| m.len() as i64);
        let batch_name = derive_batch_name(path);
        let stage_key = batch_name.clone();

        let staged_rows = self.staging.stage_file(path, &stage_key).await?;
        let rows = self.staging.staged_rows(&stage_key)?;

        let report = quality::build_report(&rows, &batch_name);
        self.log_advisories(&rows, &report);
        info!(
            "quality score for '{batch_name}': {:.1}/100",
            report.quality_score
        );

        let symbol = resolve_symbol(&rows, request.symbol_override.as_deref())?;

        if request.dry_run {
            info!("dry run complete for {}, nothing loaded", path.display());
            return Ok(LoadReport {
                batch_id: None,
                symbol,
                staged_rows,
                quality: report,
                outcome: None,
            });
        }

        let source = self.sources.resolve_active(&request.source_name)?;

        let meta = BatchMeta {
            source_id: source.id.clone(),
            batch_name: batch_name.clone(),
            file_path: Some(path.display().to_string()),
            file_size_bytes: file_size,
            row_count: Some(rows.len() as i64),
            quality_score: Some(report.quality_score),
        };

        // Gate: below the threshold the attempt still leaves its audit row.
        if report.quality_score < self.config.min_quality_score {
            let batch = self.batches.open(meta).await?;
            let gate_error = Error::QualityGate {
                score: report.quality_score,
                min_score: self.config.min_quality_score,
            };
            self.batches
                .finalize(
                    &batch.id,
                    BatchStatus::Failed,
                    Some(gate_error.to_string()),
                    None,
                )
                .await?;
            return Err(gate_error);
        }

        let asset = self
            .assets
            .upsert(NewAsset {
                symbol: symbol.clone(),
                asset_type: request.asset_type.clone(),
                currency: "USD".to_string(),
                exchange: request.exchange.clone(),
                company_name: request.company_name.clone(),
                sector: request.sector.clone(),
            })
            .await?;

        let batch = self.batches.open(meta).await?;

        match self
            .loader
            .insert(&rows, &asset.id, &batch.id, &source.id)
            .await
        {
            Ok(outcome) => {
                let status = if outcome.is_clean() {
                    BatchStatus::Success
                } else {
                    BatchStatus::Partial
                };
                self.batches
                    .finalize(&batch.id, status, None, Some(outcome.inserted as i64))
                    .await?;
                info!(
                    "loaded {} price records for {symbol} (batch {})",
                    outcome.inserted, batch.id
                );
                Ok(LoadReport {
                    batch_id: Some(batch.id),
                    symbol,
                    staged_rows,
                    quality: report,
                    outcome: Some(outcome),
                })
            }
            Err(load_error) => {
                // Best effort: the audit row must record the failure even
                // if finalization itself hits the same broken connection.
                if let Err(finalize_error) = self
                    .batches
                    .finalize(
                        &batch.id,
                        BatchStatus::Failed,
                        Some(load_error.to_string()),
                        None,
                    )
                    .await
                {
                    warn!("could not finalize failed batch {}: {finalize_error}", batch.id);
                }
                Err(load_error)
            }
        }
    }

    fn log_advisories(&self, rows: &[StagedRow], report: &QualityReport) {
        let summary = staging::summarize(rows);
        info!(
            "staged {} rows, {} symbols, dates {:?}..{:?}",
            summary.row_count, summary.symbol_count, summary.min_date, summary.max_date
        );

        for issue in staging::inspect(rows) {
            warn!("staging issue: {issue}");
        }

        let null_pct = required_null_pct(rows);
        if null_pct > self.config.max_null_pct {
            warn!(
                "null percentage {null_pct:.1} exceeds advisory ceiling {:.1}",
                self.config.max_null_pct
            );
        }
        if report.duplicates.percentage > self.config.max_duplicate_pct {
            warn!(
                "duplicate percentage {:.1} exceeds advisory ceiling {:.1}",
                report.duplicates.percentage, self.config.max_duplicate_pct
            );
        }
    }
}

/// Percentage of null cells among the required fields.
fn required_null_pct(rows: &[StagedRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let total = rows.len() * 3;
    let missing: usize = rows
        .iter()
        .map(|row| {
            [&row.symbol, &row.date, &row.close]
                .iter()
                .filter(|cell| cell.is_none())
                .count()
        })
        .sum();
    missing as f64 / total as f64 * 100.0
}

/// Batch names come from the file stem plus a UTC timestamp, keeping them
/// effectively unique per attempt.
fn derive_batch_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    format!("{stem}_{}", Utc::now().format("%Y%m%d_%H%M%S%3f"))
}

/// Picks the symbol for the load: an explicit override wins, otherwise the
/// staged rows must agree on exactly one symbol.
fn resolve_symbol(rows: &[StagedRow], symbol_override: Option<&str>) -> Result<String> {
    if let Some(symbol) = symbol_override {
        return Ok(symbol.to_string());
    }

    let symbols: HashSet<&str> = rows.iter().filter_map(|r| r.symbol.as_deref()).collect();
    let mut found: Vec<&str> = symbols.into_iter().collect();
    found.sort_unstable();
    match found.as_slice() {
        [symbol] => Ok((*symbol).to_string()),
        [] => Err(Error::Validation(
            crate::errors::ValidationError::MissingField("symbol".to_string()),
        )),
        _ => Err(Error::Unexpected(format!(
            "multiple symbols staged ({}), pass an explicit symbol",
            found.join(", ")
        ))),
    }
}
