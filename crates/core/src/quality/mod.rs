//! Data quality scoring.
//!
//! A batch of staged rows gets a composite 0-100 score built from four
//! equally-weighted sub-scores (completeness, validity, consistency,
//! uniqueness). The score gates admission into the warehouse; the fuller
//! [`QualityReport`] adds duplicate statistics, outlier findings, and
//! summary statistics for the batch audit trail.

mod report;
mod scorer;

pub use report::{
    build_report, DuplicateStats, ExtremeMove, OutlierReport, OutlierRow, QualityReport,
    SummaryStats,
};
pub use scorer::{breakdown, score, ScoreBreakdown};
