//! Database model for batches.

use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use stockhaus_core::batches::{Batch, BatchStatus};

use crate::utils::{format_datetime, parse_datetime};

#[derive(
    Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, Serialize,
    Deserialize, PartialEq,
)]
#[diesel(table_name = crate::schema::batches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct BatchDB {
    pub id: String,
    pub source_id: String,
    pub batch_name: String,
    pub file_path: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub row_count: Option<i64>,
    pub quality_score: Option<f64>,
    pub status: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub error_message: Option<String>,
}

impl From<Batch> for BatchDB {
    fn from(batch: Batch) -> Self {
        Self {
            id: batch.id,
            source_id: batch.source_id,
            batch_name: batch.batch_name,
            file_path: batch.file_path,
            file_size_bytes: batch.file_size_bytes,
            row_count: batch.row_count,
            quality_score: batch.quality_score,
            status: batch.status.as_str().to_string(),
            started_at: format_datetime(batch.started_at),
            finished_at: batch.finished_at.map(format_datetime),
            error_message: batch.error_message,
        }
    }
}

impl From<BatchDB> for Batch {
    fn from(db: BatchDB) -> Self {
        Batch {
            status: BatchStatus::from_str(&db.status).unwrap_or(BatchStatus::Running),
            started_at: parse_datetime(&db.started_at),
            finished_at: db.finished_at.as_deref().map(parse_datetime),
            id: db.id,
            source_id: db.source_id,
            batch_name: db.batch_name,
            file_path: db.file_path,
            file_size_bytes: db.file_size_bytes,
            row_count: db.row_count,
            quality_score: db.quality_score,
            error_message: db.error_message,
        }
    }
}
