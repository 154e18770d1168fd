//! Repository for the staging working area.
//!
//! Purge and append run as separate writer jobs on purpose: the purge
//! commits in its own transaction before the bulk write begins, so a
//! failed append leaves an empty stage key rather than a mix of files.

use async_trait::async_trait;
use diesel::prelude::*;
use log::debug;

use stockhaus_core::errors::Result;
use stockhaus_core::staging::{StagedRow, StagingStore};

use super::model::StagedRowDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::staged_prices;
use crate::utils::INSERT_BATCH_ROWS;

pub struct StagingRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl StagingRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl StagingStore for StagingRepository {
    async fn purge(&self, stage_key: &str) -> Result<usize> {
        let key = stage_key.to_string();
        self.writer
            .exec(move |conn| {
                let purged = diesel::delete(
                    staged_prices::table.filter(staged_prices::stage_key.eq(&key)),
                )
                .execute(conn)
                .into_core()?;
                debug!("purged {purged} rows from stage '{key}'");
                Ok(purged)
            })
            .await
    }

    async fn append_rows(&self, stage_key: &str, rows: &[StagedRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let db_rows: Vec<StagedRowDB> = rows
            .iter()
            .map(|row| StagedRowDB::from_staged(stage_key, row))
            .collect();

        self.writer
            .exec(move |conn| {
                let mut written = 0;
                for chunk in db_rows.chunks(INSERT_BATCH_ROWS) {
                    written += diesel::insert_into(staged_prices::table)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                Ok(written)
            })
            .await
    }

    fn fetch(&self, stage_key: &str) -> Result<Vec<StagedRow>> {
        let mut conn = get_connection(&self.pool)?;

        let results = staged_prices::table
            .select(StagedRowDB::as_select())
            .filter(staged_prices::stage_key.eq(stage_key))
            .order(staged_prices::row_number.asc())
            .load::<StagedRowDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(StagedRow::from).collect())
    }
}
