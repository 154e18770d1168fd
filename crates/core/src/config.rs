//! Ingestion configuration.
//!
//! `IngestConfig` is a plain value constructed once at process start and
//! passed into each component's constructor. There is no ambient global;
//! components that need a threshold receive it explicitly.

use std::env;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Environment variable prefix for [`IngestConfig::from_env`].
const ENV_PREFIX: &str = "STOCKHAUS_";

/// Tunable knobs for the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestConfig {
    /// Minimum composite quality score (0-100) a batch must reach to be
    /// admitted into the warehouse.
    pub min_quality_score: f64,
    /// Advisory ceiling on the percentage of null required cells; exceeding
    /// it is logged, not enforced.
    pub max_null_pct: f64,
    /// Advisory ceiling on the percentage of duplicate rows; exceeding it is
    /// logged, not enforced.
    pub max_duplicate_pct: f64,
    /// Number of validated rows persisted per upsert statement batch.
    pub chunk_size: usize,
    /// Successful row insertions between gold view refreshes during a bulk
    /// run.
    pub refresh_threshold: u64,
    /// Upper bound on concurrently processed input files.
    pub max_workers: usize,
    /// Hours the gold view may trail the raw facts before the freshness
    /// check reports it stale.
    pub view_max_age_hours: i64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_quality_score: 75.0,
            max_null_pct: 5.0,
            max_duplicate_pct: 1.0,
            chunk_size: 10_000,
            refresh_threshold: 100,
            max_workers: 4,
            view_max_age_hours: 24,
        }
    }
}

impl IngestConfig {
    /// Builds a configuration from `STOCKHAUS_*` environment variables,
    /// falling back to defaults for anything unset. Unparsable values are
    /// rejected rather than silently defaulted.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = read_env("MIN_QUALITY_SCORE")? {
            config.min_quality_score = v;
        }
        if let Some(v) = read_env("MAX_NULL_PCT")? {
            config.max_null_pct = v;
        }
        if let Some(v) = read_env("MAX_DUPLICATE_PCT")? {
            config.max_duplicate_pct = v;
        }
        if let Some(v) = read_env("CHUNK_SIZE")? {
            config.chunk_size = v;
        }
        if let Some(v) = read_env("REFRESH_THRESHOLD")? {
            config.refresh_threshold = v;
        }
        if let Some(v) = read_env("MAX_WORKERS")? {
            config.max_workers = v;
        }
        if let Some(v) = read_env("VIEW_MAX_AGE_HOURS")? {
            config.view_max_age_hours = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the configured values for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.min_quality_score) {
            return Err(Error::InvalidConfigValue(format!(
                "min_quality_score must be within 0-100, got {}",
                self.min_quality_score
            )));
        }
        if !(0.0..=100.0).contains(&self.max_null_pct) {
            return Err(Error::InvalidConfigValue(format!(
                "max_null_pct must be within 0-100, got {}",
                self.max_null_pct
            )));
        }
        if !(0.0..=100.0).contains(&self.max_duplicate_pct) {
            return Err(Error::InvalidConfigValue(format!(
                "max_duplicate_pct must be within 0-100, got {}",
                self.max_duplicate_pct
            )));
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfigValue(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(Error::InvalidConfigValue(
                "max_workers must be greater than zero".to_string(),
            ));
        }
        if self.view_max_age_hours < 0 {
            return Err(Error::InvalidConfigValue(format!(
                "view_max_age_hours must not be negative, got {}",
                self.view_max_age_hours
            )));
        }
        if self.refresh_threshold == 0 {
            warn!("refresh_threshold of 0 refreshes the gold view after every file");
        }
        Ok(())
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    let full_key = format!("{ENV_PREFIX}{key}");
    match env::var(&full_key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::InvalidConfigValue(format!("{full_key}: cannot parse '{raw}'"))
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(Error::InvalidConfigValue(format!(
            "{full_key}: value is not valid unicode"
        ))),
    }
}
