//! Repository for price facts.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use log::warn;

use stockhaus_core::errors::Result;
use stockhaus_core::prices::{PriceRecord, PriceStore, UpsertReport};

use super::model::{PriceFactDB, DATE_FORMAT};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{assets, price_facts};
use crate::utils::{parse_datetime, INSERT_BATCH_ROWS};

pub struct PriceRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PriceStore for PriceRepository {
    async fn upsert_prices(&self, records: &[PriceRecord]) -> Result<UpsertReport> {
        if records.is_empty() {
            return Ok(UpsertReport::default());
        }

        let db_rows: Vec<PriceFactDB> = records.iter().map(PriceFactDB::from).collect();

        self.writer
            .exec(move |conn| {
                let mut report = UpsertReport::default();
                for chunk in db_rows.chunks(INSERT_BATCH_ROWS) {
                    // REPLACE INTO on the (asset, date, source, granularity)
                    // key: conflicting facts are overwritten wholesale.
                    match diesel::replace_into(price_facts::table)
                        .values(chunk)
                        .execute(conn)
                    {
                        Ok(persisted) => report.persisted += persisted,
                        Err(DieselError::DatabaseError(_, _)) => {
                            // One bad row poisons a multi-row statement.
                            // Retry the chunk row by row so the rest land.
                            for row in chunk {
                                match diesel::replace_into(price_facts::table)
                                    .values(row)
                                    .execute(conn)
                                {
                                    Ok(persisted) => report.persisted += persisted,
                                    Err(DieselError::DatabaseError(_, info)) => {
                                        warn!(
                                            "skipping price fact {}/{}: {}",
                                            row.asset_id,
                                            row.price_date,
                                            info.message()
                                        );
                                        report.failed += 1;
                                    }
                                    Err(other) => {
                                        return Err(StorageError::QueryFailed(other).into())
                                    }
                                }
                            }
                        }
                        Err(other) => return Err(StorageError::QueryFailed(other).into()),
                    }
                }
                Ok(report)
            })
            .await
    }

    fn count_for_asset(&self, asset_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        price_facts::table
            .filter(price_facts::asset_id.eq(asset_id))
            .count()
            .get_result(&mut conn)
            .into_core()
    }

    fn range(
        &self,
        asset_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let start_str = start.format(DATE_FORMAT).to_string();
        let end_str = end.format(DATE_FORMAT).to_string();

        let results = price_facts::table
            .select(PriceFactDB::as_select())
            .filter(price_facts::asset_id.eq(asset_id))
            .filter(price_facts::price_date.ge(start_str))
            .filter(price_facts::price_date.le(end_str))
            .order(price_facts::price_date.asc())
            .load::<PriceFactDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(PriceRecord::from).collect())
    }

    fn symbols_loaded_for_source(&self, source_id: &str) -> Result<HashSet<String>> {
        let mut conn = get_connection(&self.pool)?;

        let symbols = price_facts::table
            .inner_join(assets::table)
            .filter(price_facts::source_id.eq(source_id))
            .select(assets::symbol)
            .distinct()
            .load::<String>(&mut conn)
            .into_core()?;

        Ok(symbols.into_iter().collect())
    }

    fn latest_fact_created_at(&self) -> Result<Option<DateTime<Utc>>> {
        let mut conn = get_connection(&self.pool)?;

        let latest: Option<String> = price_facts::table
            .select(diesel::dsl::max(price_facts::created_at))
            .get_result(&mut conn)
            .into_core()?;

        Ok(latest.as_deref().map(parse_datetime))
    }
}
