//! Gold view freshness monitoring.
//!
//! Compares the gold view's latest refresh against the latest raw fact and
//! reports how far the view trails. Monitoring only - nothing here blocks a
//! load or a refresh.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use super::store::GoldStore;
use crate::errors::Result;
use crate::prices::PriceStore;

/// Freshness verdict for a gold view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ViewFreshness {
    Fresh { hours_behind: f64 },
    Stale { hours_behind: f64 },
    /// Either side has no timestamp yet; staleness cannot be determined.
    Unknown,
}

impl ViewFreshness {
    /// An undeterminable view is reported as not fresh.
    pub fn is_fresh(&self) -> bool {
        matches!(self, ViewFreshness::Fresh { .. })
    }
}

/// Compares gold view recency against the raw price facts.
pub struct FreshnessCheck {
    gold: Arc<dyn GoldStore>,
    prices: Arc<dyn PriceStore>,
}

impl FreshnessCheck {
    pub fn new(gold: Arc<dyn GoldStore>, prices: Arc<dyn PriceStore>) -> Self {
        Self { gold, prices }
    }

    /// Reports whether `view` is within `max_age_hours` of the raw facts.
    pub fn check(&self, view: &str, max_age_hours: i64) -> Result<ViewFreshness> {
        let latest_fact = self.prices.latest_fact_created_at()?;
        let latest_refresh = self.gold.latest_view_refreshed_at(view)?;

        let (Some(fact_at), Some(refreshed_at)) = (latest_fact, latest_refresh) else {
            warn!("cannot determine freshness of '{view}': missing timestamps");
            return Ok(ViewFreshness::Unknown);
        };

        // A refresh after the last load means the view is fully caught up.
        let hours_behind = ((fact_at - refreshed_at).num_seconds() as f64 / 3600.0).max(0.0);

        let freshness = if hours_behind <= max_age_hours as f64 {
            debug!("view '{view}' is {hours_behind:.1} hours behind (acceptable)");
            ViewFreshness::Fresh { hours_behind }
        } else {
            warn!("view '{view}' is {hours_behind:.1} hours behind raw data");
            ViewFreshness::Stale { hours_behind }
        };
        Ok(freshness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gold::store::GoldViewStats;
    use crate::prices::{PriceRecord, UpsertReport};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use std::collections::HashSet;

    struct FixedTimestamps {
        fact_at: Option<DateTime<Utc>>,
        refreshed_at: Option<DateTime<Utc>>,
    }

    #[async_trait]
    impl GoldStore for FixedTimestamps {
        fn supports_concurrent_refresh(&self, _view: &str) -> Result<bool> {
            Ok(true)
        }
        async fn refresh_blocking(&self, _view: &str) -> Result<()> {
            Ok(())
        }
        async fn refresh_concurrent(&self, _view: &str) -> Result<()> {
            Ok(())
        }
        fn view_stats(&self, _view: &str) -> Result<GoldViewStats> {
            Ok(GoldViewStats {
                row_count: 0,
                symbol_count: 0,
                min_date: None,
                max_date: None,
            })
        }
        fn latest_view_refreshed_at(&self, _view: &str) -> Result<Option<DateTime<Utc>>> {
            Ok(self.refreshed_at)
        }
    }

    #[async_trait]
    impl PriceStore for FixedTimestamps {
        async fn upsert_prices(&self, _records: &[PriceRecord]) -> Result<UpsertReport> {
            Ok(UpsertReport::default())
        }
        fn count_for_asset(&self, _asset_id: &str) -> Result<i64> {
            Ok(0)
        }
        fn range(
            &self,
            _asset_id: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<PriceRecord>> {
            Ok(Vec::new())
        }
        fn symbols_loaded_for_source(&self, _source_id: &str) -> Result<HashSet<String>> {
            Ok(HashSet::new())
        }
        fn latest_fact_created_at(&self) -> Result<Option<DateTime<Utc>>> {
            Ok(self.fact_at)
        }
    }

    fn check_with(
        fact_at: Option<DateTime<Utc>>,
        refreshed_at: Option<DateTime<Utc>>,
    ) -> ViewFreshness {
        let store = Arc::new(FixedTimestamps {
            fact_at,
            refreshed_at,
        });
        FreshnessCheck::new(store.clone(), store)
            .check("gold_prices", 24)
            .unwrap()
    }

    #[test]
    fn view_refreshed_after_last_load_is_fresh() {
        let now = Utc::now();
        let verdict = check_with(Some(now - Duration::hours(2)), Some(now));
        assert_eq!(verdict, ViewFreshness::Fresh { hours_behind: 0.0 });
    }

    #[test]
    fn view_trailing_beyond_threshold_is_stale() {
        let now = Utc::now();
        let verdict = check_with(Some(now), Some(now - Duration::hours(48)));
        assert!(matches!(verdict, ViewFreshness::Stale { .. }));
        assert!(!verdict.is_fresh());
    }

    #[test]
    fn view_slightly_behind_is_still_fresh() {
        let now = Utc::now();
        let verdict = check_with(Some(now), Some(now - Duration::hours(3)));
        assert!(verdict.is_fresh());
    }

    #[test]
    fn missing_timestamps_are_unknown_and_not_fresh() {
        assert_eq!(check_with(None, None), ViewFreshness::Unknown);
        assert_eq!(check_with(Some(Utc::now()), None), ViewFreshness::Unknown);
        assert!(!ViewFreshness::Unknown.is_fresh());
    }
}
