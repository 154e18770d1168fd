//! Gold view storage trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Name of the daily price gold view.
pub const DAILY_GOLD_VIEW: &str = "gold_prices";

/// Statistics about a gold view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldViewStats {
    pub row_count: i64,
    pub symbol_count: i64,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

/// Storage interface for derived gold datasets.
#[async_trait]
pub trait GoldStore: Send + Sync {
    /// Whether the view carries the unique index the non-blocking
    /// (incremental merge) path requires.
    fn supports_concurrent_refresh(&self, view: &str) -> Result<bool>;

    /// Full rebuild inside one write transaction. Readers of the view block
    /// on the rebuild, hence "blocking".
    async fn refresh_blocking(&self, view: &str) -> Result<()>;

    /// Incremental merge-upsert of current facts into the view. Requires
    /// the unique key; leaves existing rows readable throughout.
    async fn refresh_concurrent(&self, view: &str) -> Result<()>;

    /// Row count, distinct symbols, and date bounds for the view.
    fn view_stats(&self, view: &str) -> Result<GoldViewStats>;

    /// Timestamp of the view's most recent refresh, if it ever ran.
    fn latest_view_refreshed_at(&self, view: &str) -> Result<Option<DateTime<Utc>>>;
}
