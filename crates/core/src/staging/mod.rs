//! Staging and normalization of raw input files.
//!
//! One load attempt stages one file: the normalizer maps heterogeneous
//! column headers onto canonical fields and produces raw, string-typed
//! [`StagedRow`]s; the [`StagingArea`] persists them under a per-attempt
//! stage key with purge-then-write semantics.

mod area;
mod model;
mod normalizer;
mod store;

pub use area::StagingArea;
pub use model::{inspect, summarize, StagedRow, StagingIssue, StagingSummary};
pub use normalizer::{infer_symbol_from_filename, normalize_file, NormalizedFile};
pub use store::StagingStore;
