//! End-to-end ingestion pipeline.
//!
//! One file flows stage -> score -> gate -> asset -> batch -> load ->
//! finalize. Processing one file end-to-end is the unit of safe
//! concurrency; the bulk runner fans files out across a bounded worker pool
//! and owns the gold refresh batching policy.

mod runner;
mod service;

pub use runner::{BulkRunner, RunSummary};
pub use service::{IngestPipeline, LoadReport, LoadRequest};
