//! Database model for staged rows.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use stockhaus_core::staging::StagedRow;

#[derive(
    Queryable, Selectable, Insertable, Debug, Clone, Serialize, Deserialize, PartialEq,
)]
#[diesel(table_name = crate::schema::staged_prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct StagedRowDB {
    pub stage_key: String,
    pub row_number: i64,
    pub symbol: Option<String>,
    pub price_date: Option<String>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
    pub adjusted_close: Option<String>,
    pub source_file: String,
}

impl StagedRowDB {
    pub fn from_staged(stage_key: &str, row: &StagedRow) -> Self {
        Self {
            stage_key: stage_key.to_string(),
            row_number: row.row_number,
            symbol: row.symbol.clone(),
            price_date: row.date.clone(),
            open: row.open.clone(),
            high: row.high.clone(),
            low: row.low.clone(),
            close: row.close.clone(),
            volume: row.volume.clone(),
            adjusted_close: row.adjusted_close.clone(),
            source_file: row.source_file.clone(),
        }
    }
}

impl From<StagedRowDB> for StagedRow {
    fn from(db: StagedRowDB) -> Self {
        StagedRow {
            row_number: db.row_number,
            symbol: db.symbol,
            date: db.price_date,
            open: db.open,
            high: db.high,
            low: db.low,
            close: db.close,
            volume: db.volume,
            adjusted_close: db.adjusted_close,
            source_file: db.source_file,
        }
    }
}
