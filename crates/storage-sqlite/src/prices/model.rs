//! Database model for price facts.

use std::str::FromStr;

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockhaus_core::prices::{Granularity, PriceRecord};

use crate::utils::{format_datetime, parse_datetime};

/// Stored date format for price dates; ISO ordering doubles as
/// chronological ordering.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, Serialize, Deserialize,
    PartialEq, QueryableByName,
)]
#[diesel(table_name = crate::schema::price_facts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PriceFactDB {
    pub asset_id: String,
    pub price_date: String,
    pub source_id: String,
    pub granularity: String,
    pub batch_id: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: Option<i64>,
    pub adjusted_close: Option<String>,
    pub created_at: String,
}

impl From<&PriceRecord> for PriceFactDB {
    fn from(record: &PriceRecord) -> Self {
        Self {
            asset_id: record.asset_id.clone(),
            price_date: record.price_date.format(DATE_FORMAT).to_string(),
            source_id: record.source_id.clone(),
            granularity: record.granularity.as_str().to_string(),
            batch_id: record.batch_id.clone(),
            open: record.open.to_string(),
            high: record.high.to_string(),
            low: record.low.to_string(),
            close: record.close.to_string(),
            volume: record.volume,
            adjusted_close: record.adjusted_close.map(|d| d.to_string()),
            created_at: format_datetime(record.created_at),
        }
    }
}

impl From<PriceFactDB> for PriceRecord {
    fn from(db: PriceFactDB) -> Self {
        let parse_decimal = |raw: &str| Decimal::from_str(raw).unwrap_or_default();
        PriceRecord {
            price_date: NaiveDate::parse_from_str(&db.price_date, DATE_FORMAT)
                .unwrap_or_default(),
            granularity: Granularity::from_str(&db.granularity).unwrap_or_default(),
            open: parse_decimal(&db.open),
            high: parse_decimal(&db.high),
            low: parse_decimal(&db.low),
            close: parse_decimal(&db.close),
            adjusted_close: db.adjusted_close.as_deref().map(parse_decimal),
            created_at: parse_datetime(&db.created_at),
            asset_id: db.asset_id,
            batch_id: db.batch_id,
            source_id: db.source_id,
            volume: db.volume,
        }
    }
}
