//! Batch domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Error, Result};

/// Lifecycle status of a batch.
///
/// A batch starts `Running` and moves exactly once to one of the terminal
/// states. `Partial` means some rows were admitted and some rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    #[default]
    Running,
    Success,
    Failed,
    Partial,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Running => "RUNNING",
            BatchStatus::Success => "SUCCESS",
            BatchStatus::Failed => "FAILED",
            BatchStatus::Partial => "PARTIAL",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BatchStatus::Running)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RUNNING" => Ok(BatchStatus::Running),
            "SUCCESS" => Ok(BatchStatus::Success),
            "FAILED" => Ok(BatchStatus::Failed),
            "PARTIAL" => Ok(BatchStatus::Partial),
            other => Err(Error::Batch(format!("unknown batch status '{other}'"))),
        }
    }
}

/// Metadata captured when a batch is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeta {
    pub source_id: String,
    /// Should be unique per attempt; derive from symbol + timestamp.
    pub batch_name: String,
    pub file_path: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub row_count: Option<i64>,
    pub quality_score: Option<f64>,
}

/// One load attempt's audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub source_id: String,
    pub batch_name: String,
    pub file_path: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub row_count: Option<i64>,
    pub quality_score: Option<f64>,
    pub status: BatchStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl Batch {
    /// Creates a new batch in the running state.
    pub fn open(meta: BatchMeta) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_id: meta.source_id,
            batch_name: meta.batch_name,
            file_path: meta.file_path,
            file_size_bytes: meta.file_size_bytes,
            row_count: meta.row_count,
            quality_score: meta.quality_score,
            status: BatchStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            error_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_starts_running_without_end_time() {
        let batch = Batch::open(BatchMeta {
            source_id: "src-1".to_string(),
            batch_name: "AAPL_20240102_093000".to_string(),
            file_path: Some("/data/AAPL.csv".to_string()),
            file_size_bytes: Some(2048),
            row_count: Some(10),
            quality_score: Some(98.5),
        });

        assert_eq!(batch.status, BatchStatus::Running);
        assert!(batch.finished_at.is_none());
        assert!(batch.error_message.is_none());
        assert!(!batch.status.is_terminal());
    }

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            BatchStatus::Running,
            BatchStatus::Success,
            BatchStatus::Failed,
            BatchStatus::Partial,
        ] {
            assert_eq!(status.as_str().parse::<BatchStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<BatchStatus>().is_err());
    }
}
