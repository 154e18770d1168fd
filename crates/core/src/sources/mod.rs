//! Data source registry.
//!
//! Data sources are named provenance origins (feeds, manual uploads). The
//! pipeline never writes them; it resolves a name to an identifier and
//! refuses to load from a source that is missing or inactive.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::{Error, Result};

/// A named origin of price data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub source_name: String,
    pub source_type: String,
    pub is_active: bool,
    /// Requests per minute the upstream allows, if known.
    pub rate_limit: Option<i32>,
    pub api_key_required: bool,
}

/// Read-only storage interface for data sources.
pub trait SourceStore: Send + Sync {
    fn get_by_name(&self, source_name: &str) -> Result<Option<DataSource>>;

    fn list(&self) -> Result<Vec<DataSource>>;
}

/// Resolves source names for the pipeline.
pub struct SourceService {
    store: Arc<dyn SourceStore>,
}

impl SourceService {
    pub fn new(store: Arc<dyn SourceStore>) -> Self {
        Self { store }
    }

    /// Resolves a source by name, requiring it to exist and be active.
    pub fn resolve_active(&self, source_name: &str) -> Result<DataSource> {
        match self.store.get_by_name(source_name)? {
            Some(source) if source.is_active => Ok(source),
            Some(source) => Err(Error::Source(format!(
                "data source '{}' is inactive",
                source.source_name
            ))),
            None => Err(Error::Source(format!(
                "data source '{source_name}' not found"
            ))),
        }
    }

    pub fn list(&self) -> Result<Vec<DataSource>> {
        self.store.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSources(Vec<DataSource>);

    impl SourceStore for FixedSources {
        fn get_by_name(&self, source_name: &str) -> Result<Option<DataSource>> {
            Ok(self
                .0
                .iter()
                .find(|s| s.source_name == source_name)
                .cloned())
        }

        fn list(&self) -> Result<Vec<DataSource>> {
            Ok(self.0.clone())
        }
    }

    fn service() -> SourceService {
        SourceService::new(Arc::new(FixedSources(vec![
            DataSource {
                id: "src-1".to_string(),
                source_name: "YAHOO_FINANCE_API".to_string(),
                source_type: "API".to_string(),
                is_active: true,
                rate_limit: Some(60),
                api_key_required: false,
            },
            DataSource {
                id: "src-2".to_string(),
                source_name: "LEGACY_FTP".to_string(),
                source_type: "FILE".to_string(),
                is_active: false,
                rate_limit: None,
                api_key_required: false,
            },
        ])))
    }

    #[test]
    fn resolves_active_source() {
        let source = service().resolve_active("YAHOO_FINANCE_API").unwrap();
        assert_eq!(source.id, "src-1");
    }

    #[test]
    fn inactive_source_is_an_error() {
        assert!(matches!(
            service().resolve_active("LEGACY_FTP"),
            Err(Error::Source(_))
        ));
    }

    #[test]
    fn unknown_source_is_an_error() {
        assert!(matches!(
            service().resolve_active("NOPE"),
            Err(Error::Source(_))
        ));
    }
}
