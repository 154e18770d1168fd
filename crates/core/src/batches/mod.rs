//! Batch lineage tracking.
//!
//! Every load attempt opens exactly one batch - the audit record carrying
//! the source, file provenance, row count, and quality score - and
//! finalizes it exactly once to a terminal status. Batches are never
//! deleted; a crash mid-load leaves the row in the running state as its own
//! kind of evidence.

mod model;
mod store;
mod tracker;

pub use model::{Batch, BatchMeta, BatchStatus};
pub use store::BatchStore;
pub use tracker::BatchTracker;
