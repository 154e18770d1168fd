//! Repository for batch audit records.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use stockhaus_core::batches::{Batch, BatchStatus, BatchStore};
use stockhaus_core::errors::{DatabaseError, Error, Result};

use super::model::BatchDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::batches;
use crate::utils::format_datetime;

pub struct BatchRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl BatchRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl BatchStore for BatchRepository {
    async fn create(&self, batch: Batch) -> Result<Batch> {
        self.writer
            .exec(move |conn| {
                let db_row = BatchDB::from(batch);
                diesel::insert_into(batches::table)
                    .values(&db_row)
                    .execute(conn)
                    .into_core()?;
                Ok(db_row.into())
            })
            .await
    }

    async fn finalize(
        &self,
        batch_id: &str,
        status: BatchStatus,
        error_message: Option<String>,
        final_row_count: Option<i64>,
    ) -> Result<()> {
        let id = batch_id.to_string();
        self.writer
            .exec(move |conn| {
                let affected = diesel::update(batches::table.find(&id))
                    .set((
                        batches::status.eq(status.as_str()),
                        batches::finished_at.eq(Some(format_datetime(Utc::now()))),
                        batches::error_message.eq(error_message),
                    ))
                    .execute(conn)
                    .into_core()?;
                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "batch {id}"
                    ))));
                }

                // Row count only overwrites when the caller supplied one.
                if let Some(count) = final_row_count {
                    diesel::update(batches::table.find(&id))
                        .set(batches::row_count.eq(Some(count)))
                        .execute(conn)
                        .into_core()?;
                }
                Ok(())
            })
            .await
    }

    fn get_by_id(&self, batch_id: &str) -> Result<Option<Batch>> {
        let mut conn = get_connection(&self.pool)?;

        let result = batches::table
            .select(BatchDB::as_select())
            .find(batch_id)
            .first::<BatchDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(result.map(Batch::from))
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<Batch>> {
        let mut conn = get_connection(&self.pool)?;

        let results = batches::table
            .select(BatchDB::as_select())
            .order(batches::started_at.desc())
            .limit(limit)
            .load::<BatchDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Batch::from).collect())
    }
}
