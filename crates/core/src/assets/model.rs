//! Asset domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Classification of a tradeable asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Stock,
    Etf,
    Crypto,
    Index,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "STOCK",
            AssetType::Etf => "ETF",
            AssetType::Crypto => "CRYPTO",
            AssetType::Index => "INDEX",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "STOCK" => Ok(AssetType::Stock),
            "ETF" => Ok(AssetType::Etf),
            "CRYPTO" => Ok(AssetType::Crypto),
            "INDEX" => Ok(AssetType::Index),
            other => Err(Error::Asset(format!("unknown asset type '{other}'"))),
        }
    }
}

/// Canonical security identity. Unique by (symbol, asset_type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub symbol: String,
    pub asset_type: AssetType,
    pub currency: String,
    pub exchange: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating (or merging into) an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub symbol: String,
    pub asset_type: AssetType,
    pub currency: String,
    pub exchange: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
}

impl NewAsset {
    /// Creates a minimal payload with the default USD currency.
    pub fn new(symbol: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            symbol: symbol.into(),
            asset_type,
            currency: "USD".to_string(),
            exchange: None,
            company_name: None,
            sector: None,
        }
    }
}

/// Coalescing metadata update for an existing asset.
///
/// `None` fields are left untouched by the repository; an update never
/// clears a previously-stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub exchange: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<Decimal>,
}

impl AssetUpdate {
    /// Builds an update carrying only the non-empty optional fields of a
    /// sighting.
    pub fn from_sighting(sighting: &NewAsset) -> Self {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        Self {
            exchange: non_empty(&sighting.exchange),
            company_name: non_empty(&sighting.company_name),
            sector: non_empty(&sighting.sector),
            market_cap: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exchange.is_none()
            && self.company_name.is_none()
            && self.sector.is_none()
            && self.market_cap.is_none()
    }
}
