//! Database models for assets.

use std::str::FromStr;

use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockhaus_core::assets::{Asset, AssetType, AssetUpdate, NewAsset};

use crate::utils::{format_datetime, parse_datetime};

/// Database model for assets.
#[derive(
    Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, Serialize,
    Deserialize, PartialEq,
)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AssetDB {
    pub id: String,
    pub symbol: String,
    pub asset_type: String,
    pub currency: String,
    pub exchange: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Coalescing update payload. `None` fields are skipped by Diesel, so an
/// update can never clear a stored value.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::assets)]
pub struct AssetUpdateDB {
    pub exchange: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<String>,
    pub updated_at: Option<String>,
}

impl From<AssetDB> for Asset {
    fn from(db: AssetDB) -> Self {
        Asset {
            asset_type: AssetType::from_str(&db.asset_type).unwrap_or(AssetType::Stock),
            market_cap: db.market_cap.as_deref().and_then(|v| Decimal::from_str(v).ok()),
            created_at: parse_datetime(&db.created_at),
            updated_at: parse_datetime(&db.updated_at),
            id: db.id,
            symbol: db.symbol,
            currency: db.currency,
            exchange: db.exchange,
            company_name: db.company_name,
            sector: db.sector,
            is_active: db.is_active,
        }
    }
}

impl AssetDB {
    /// Builds the row for a first sighting.
    pub fn from_new(new_asset: NewAsset) -> Self {
        let now = format_datetime(Utc::now());
        Self {
            id: Uuid::new_v4().to_string(),
            symbol: new_asset.symbol,
            asset_type: new_asset.asset_type.as_str().to_string(),
            currency: new_asset.currency,
            exchange: new_asset.exchange,
            company_name: new_asset.company_name,
            sector: new_asset.sector,
            market_cap: None,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl From<AssetUpdate> for AssetUpdateDB {
    fn from(update: AssetUpdate) -> Self {
        Self {
            exchange: update.exchange,
            company_name: update.company_name,
            sector: update.sector,
            market_cap: update.market_cap.map(|d| d.to_string()),
            updated_at: Some(format_datetime(Utc::now())),
        }
    }
}
