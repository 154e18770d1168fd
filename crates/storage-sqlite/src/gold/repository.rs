//! Repository for the derived gold dataset.
//!
//! The gold table holds one clean row per (symbol, date), rebuilt from the
//! raw facts joined to assets and sources. Both refresh paths insert in
//! `created_at` order with REPLACE semantics, so the newest fact wins for
//! a key; the blocking path additionally empties the table first inside
//! the same transaction, which drops rows whose facts disappeared at the
//! cost of readers seeing the rebuild.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};

use stockhaus_core::errors::{DatabaseError, Error, Result};
use stockhaus_core::gold::{GoldStore, GoldViewStats, DAILY_GOLD_VIEW};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::prices::DATE_FORMAT;
use crate::schema::gold_prices;
use crate::utils::{format_datetime, parse_datetime};

/// Merge of current facts into the gold table. Ascending `created_at`
/// order makes REPLACE keep the newest fact per (symbol, date).
const MERGE_SQL: &str = "\
    INSERT OR REPLACE INTO gold_prices \
        (symbol, price_date, open, high, low, close, volume, adjusted_close, \
         currency, source_name, refreshed_at) \
    SELECT a.symbol, p.price_date, p.open, p.high, p.low, p.close, p.volume, \
           p.adjusted_close, a.currency, d.source_name, ? \
    FROM price_facts p \
    JOIN assets a ON a.id = p.asset_id \
    JOIN data_sources d ON d.id = p.source_id \
    ORDER BY p.created_at ASC, p.rowid ASC";

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

pub struct GoldRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl GoldRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// The only gold view this schema ships. Unknown names fail loudly instead
/// of refreshing the wrong table.
fn require_known_view(view: &str) -> Result<()> {
    if view == DAILY_GOLD_VIEW {
        Ok(())
    } else {
        Err(Error::Database(DatabaseError::NotFound(format!(
            "unknown gold view '{view}'"
        ))))
    }
}

#[async_trait]
impl GoldStore for GoldRepository {
    fn supports_concurrent_refresh(&self, view: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        // Unique indexes show up in sqlite_master either as declared
        // UNIQUE indexes or as the autoindex backing a primary key.
        let row: CountRow = sql_query(
            "SELECT COUNT(*) AS count FROM sqlite_master \
             WHERE type = 'index' AND tbl_name = ? \
             AND (name LIKE 'sqlite_autoindex%' OR instr(COALESCE(sql, ''), 'UNIQUE') > 0)",
        )
        .bind::<Text, _>(view)
        .get_result(&mut conn)
        .into_core()?;

        Ok(row.count > 0)
    }

    async fn refresh_blocking(&self, view: &str) -> Result<()> {
        require_known_view(view)?;
        let refreshed_at = format_datetime(Utc::now());

        self.writer
            .exec(move |conn| {
                diesel::delete(gold_prices::table).execute(conn).into_core()?;
                sql_query(MERGE_SQL)
                    .bind::<Text, _>(&refreshed_at)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn refresh_concurrent(&self, view: &str) -> Result<()> {
        require_known_view(view)?;
        let refreshed_at = format_datetime(Utc::now());

        self.writer
            .exec(move |conn| {
                sql_query(MERGE_SQL)
                    .bind::<Text, _>(&refreshed_at)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    fn view_stats(&self, view: &str) -> Result<GoldViewStats> {
        require_known_view(view)?;
        let mut conn = get_connection(&self.pool)?;

        let row_count: i64 = gold_prices::table
            .count()
            .get_result(&mut conn)
            .into_core()?;

        let symbol_count: i64 = gold_prices::table
            .select(diesel::dsl::count_distinct(gold_prices::symbol))
            .get_result(&mut conn)
            .into_core()?;

        let min_date: Option<String> = gold_prices::table
            .select(diesel::dsl::min(gold_prices::price_date))
            .get_result(&mut conn)
            .into_core()?;
        let max_date: Option<String> = gold_prices::table
            .select(diesel::dsl::max(gold_prices::price_date))
            .get_result(&mut conn)
            .into_core()?;

        let parse_date =
            |raw: &str| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok();

        Ok(GoldViewStats {
            row_count,
            symbol_count,
            min_date: min_date.as_deref().and_then(parse_date),
            max_date: max_date.as_deref().and_then(parse_date),
        })
    }

    fn latest_view_refreshed_at(&self, view: &str) -> Result<Option<DateTime<Utc>>> {
        require_known_view(view)?;
        let mut conn = get_connection(&self.pool)?;

        let latest: Option<String> = gold_prices::table
            .select(diesel::dsl::max(gold_prices::refreshed_at))
            .get_result(&mut conn)
            .into_core()?;

        Ok(latest.as_deref().map(parse_datetime))
    }
}
