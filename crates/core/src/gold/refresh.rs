//! Gold view refresh coordination.
//!
//! Refreshing is a two-step state machine with a hard retry bound of one:
//!
//! ```text
//! REQUESTED -> ATTEMPT_NON_BLOCKING -> SUCCESS
//!                                   -> ATTEMPT_BLOCKING -> SUCCESS
//!                                                       -> FAILED
//! ```
//!
//! A non-blocking request against a view without the required unique index
//! is silently demoted to blocking (logged, never raised). A blocking
//! failure is terminal; it is never retried.
//!
//! The coordinator is not reentrant against the same view: callers hold one
//! logical coordinator and serialize refresh invocations through it.

use std::sync::Arc;

use log::{info, warn};

use super::store::GoldStore;
use crate::errors::{RefreshError, Result};

/// The two refresh strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshMode {
    NonBlocking,
    Blocking,
}

/// Coordinates gold view refreshes against a [`GoldStore`].
pub struct RefreshCoordinator {
    store: Arc<dyn GoldStore>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<dyn GoldStore>) -> Self {
        Self { store }
    }

    /// Refreshes `view`, preferring the non-blocking path when asked.
    ///
    /// Exactly one fallback: a failed non-blocking attempt is retried in
    /// blocking mode, whose failure propagates as [`RefreshError`].
    pub async fn refresh(&self, view: &str, prefer_non_blocking: bool) -> Result<()> {
        let mut mode = if prefer_non_blocking {
            RefreshMode::NonBlocking
        } else {
            RefreshMode::Blocking
        };

        if mode == RefreshMode::NonBlocking && !self.concurrent_refresh_available(view) {
            warn!("view '{view}' has no unique index, demoting to blocking refresh");
            mode = RefreshMode::Blocking;
        }

        match mode {
            RefreshMode::NonBlocking => match self.store.refresh_concurrent(view).await {
                Ok(()) => {
                    info!("non-blocking refresh of '{view}' succeeded");
                    Ok(())
                }
                Err(first_failure) => {
                    warn!(
                        "non-blocking refresh of '{view}' failed ({first_failure}), \
                         retrying in blocking mode"
                    );
                    self.blocking_refresh(view).await
                }
            },
            RefreshMode::Blocking => self.blocking_refresh(view).await,
        }
    }

    async fn blocking_refresh(&self, view: &str) -> Result<()> {
        match self.store.refresh_blocking(view).await {
            Ok(()) => {
                info!("blocking refresh of '{view}' succeeded");
                Ok(())
            }
            Err(failure) => Err(RefreshError::BlockingFailed {
                view: view.to_string(),
                reason: failure.to_string(),
            }
            .into()),
        }
    }

    fn concurrent_refresh_available(&self, view: &str) -> bool {
        match self.store.supports_concurrent_refresh(view) {
            Ok(supported) => supported,
            Err(e) => {
                warn!("could not check unique indexes on '{view}': {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatabaseError, Error};
    use crate::gold::store::GoldViewStats;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedGoldStore {
        has_unique_index: bool,
        concurrent_fails: bool,
        blocking_fails: bool,
        concurrent_calls: AtomicUsize,
        blocking_calls: AtomicUsize,
        refreshed_views: Mutex<Vec<String>>,
    }

    impl ScriptedGoldStore {
        fn with_unique_index() -> Self {
            Self {
                has_unique_index: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl GoldStore for ScriptedGoldStore {
        fn supports_concurrent_refresh(&self, _view: &str) -> Result<bool> {
            Ok(self.has_unique_index)
        }

        async fn refresh_blocking(&self, view: &str) -> Result<()> {
            self.blocking_calls.fetch_add(1, Ordering::SeqCst);
            if self.blocking_fails {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "rebuild failed".to_string(),
                )));
            }
            self.refreshed_views.lock().unwrap().push(view.to_string());
            Ok(())
        }

        async fn refresh_concurrent(&self, view: &str) -> Result<()> {
            self.concurrent_calls.fetch_add(1, Ordering::SeqCst);
            if self.concurrent_fails {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "merge failed".to_string(),
                )));
            }
            self.refreshed_views.lock().unwrap().push(view.to_string());
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
            Ok(None)
        }
    }

    #[tokio::test]
    async fn prefers_non_blocking_when_supported() {
        let store = Arc::new(ScriptedGoldStore::with_unique_index());
        let coordinator = RefreshCoordinator::new(store.clone());

        coordinator.refresh("gold_prices", true).await.unwrap();

        assert_eq!(store.concurrent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.blocking_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_unique_index_demotes_to_blocking_without_raising() {
        let store = Arc::new(ScriptedGoldStore::default());
        let coordinator = RefreshCoordinator::new(store.clone());

        coordinator.refresh("gold_prices", true).await.unwrap();

        assert_eq!(store.concurrent_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.blocking_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_non_blocking_attempt_falls_back_exactly_once() {
        let store = Arc::new(ScriptedGoldStore {
            has_unique_index: true,
            concurrent_fails: true,
            ..Default::default()
        });
        let coordinator = RefreshCoordinator::new(store.clone());

        coordinator.refresh("gold_prices", true).await.unwrap();

        assert_eq!(store.concurrent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.blocking_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blocking_failure_after_fallback_propagates() {
        let store = Arc::new(ScriptedGoldStore {
            has_unique_index: true,
            concurrent_fails: true,
            blocking_fails: true,
            ..Default::default()
        });
        let coordinator = RefreshCoordinator::new(store.clone());

        let result = coordinator.refresh("gold_prices", true).await;

        assert!(matches!(
            result,
            Err(Error::Refresh(RefreshError::BlockingFailed { .. }))
        ));
        // The hard retry bound: one blocking attempt, never more.
        assert_eq!(store.blocking_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn explicit_blocking_request_never_tries_concurrent() {
        let store = Arc::new(ScriptedGoldStore::with_unique_index());
        let coordinator = RefreshCoordinator::new(store.clone());

        coordinator.refresh("gold_prices", false).await.unwrap();

        assert_eq!(store.concurrent_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.blocking_calls.load(Ordering::SeqCst), 1);
    }
}
