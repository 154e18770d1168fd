//! Database model for data sources.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use stockhaus_core::sources::DataSource;

#[derive(
    Queryable, Identifiable, Selectable, Insertable, Debug, Clone, Serialize, Deserialize,
    PartialEq,
)]
#[diesel(table_name = crate::schema::data_sources)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DataSourceDB {
    pub id: String,
    pub source_name: String,
    pub source_type: String,
    pub is_active: bool,
    pub rate_limit: Option<i32>,
    pub api_key_required: bool,
}

impl From<DataSourceDB> for DataSource {
    fn from(db: DataSourceDB) -> Self {
        DataSource {
            id: db.id,
            source_name: db.source_name,
            source_type: db.source_type,
            is_active: db.is_active,
            rate_limit: db.rate_limit,
            api_key_required: db.api_key_required,
        }
    }
}
