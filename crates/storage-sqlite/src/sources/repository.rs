//! Repository for data source lookups.
//!
//! Sources are seeded by migrations and read-only to the pipeline, so this
//! repository has no write side.

use diesel::prelude::*;

use stockhaus_core::errors::Result;
use stockhaus_core::sources::{DataSource, SourceStore};

use super::model::DataSourceDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::data_sources;

pub struct SourceRepository {
    pool: DbPool,
}

impl SourceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SourceStore for SourceRepository {
    fn get_by_name(&self, source_name: &str) -> Result<Option<DataSource>> {
        let mut conn = get_connection(&self.pool)?;

        let result = data_sources::table
            .select(DataSourceDB::as_select())
            .filter(data_sources::source_name.eq(source_name))
            .first::<DataSourceDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(result.map(DataSource::from))
    }

    fn list(&self) -> Result<Vec<DataSource>> {
        let mut conn = get_connection(&self.pool)?;

        let results = data_sources::table
            .select(DataSourceDB::as_select())
            .order((data_sources::source_type.asc(), data_sources::source_name.asc()))
            .load::<DataSourceDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(DataSource::from).collect())
    }
}
