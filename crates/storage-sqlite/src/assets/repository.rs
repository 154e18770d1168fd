//! Repository for asset persistence.

use async_trait::async_trait;
use diesel::prelude::*;

use stockhaus_core::assets::{Asset, AssetRepositoryTrait, AssetType, AssetUpdate, NewAsset};
use stockhaus_core::errors::{DatabaseError, Error, Result};

use super::model::{AssetDB, AssetUpdateDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::assets;

pub struct AssetRepository {
    pool: DbPool,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(pool: DbPool, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    fn find_by_symbol_and_type(
        &self,
        symbol: &str,
        asset_type: &AssetType,
    ) -> Result<Option<Asset>> {
        let mut conn = get_connection(&self.pool)?;

        let result = assets::table
            .select(AssetDB::as_select())
            .filter(assets::symbol.eq(symbol))
            .filter(assets::asset_type.eq(asset_type.as_str()))
            .first::<AssetDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(result.map(Asset::from))
    }

    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        self.writer
            .exec(move |conn| {
                let db_row = AssetDB::from_new(new_asset);
                diesel::insert_into(assets::table)
                    .values(&db_row)
                    .execute(conn)
                    .into_core()?;
                Ok(db_row.into())
            })
            .await
    }

    async fn apply_update(&self, asset_id: &str, update: AssetUpdate) -> Result<Asset> {
        let id = asset_id.to_string();
        self.writer
            .exec(move |conn| {
                let changes = AssetUpdateDB::from(update);
                let affected = diesel::update(assets::table.find(&id))
                    .set(&changes)
                    .execute(conn)
                    .into_core()?;
                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "asset {id}"
                    ))));
                }

                let row = assets::table
                    .select(AssetDB::as_select())
                    .find(&id)
                    .first::<AssetDB>(conn)
                    .into_core()?;
                Ok(row.into())
            })
            .await
    }

    fn list(&self) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;

        let results = assets::table
            .select(AssetDB::as_select())
            .order(assets::symbol.asc())
            .load::<AssetDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Asset::from).collect())
    }
}
