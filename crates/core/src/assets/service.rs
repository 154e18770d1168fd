//! Asset registry service.

use std::sync::Arc;

use log::{debug, info};

use super::model::{Asset, AssetType, AssetUpdate, NewAsset};
use super::traits::AssetRepositoryTrait;
use crate::errors::{DatabaseError, Error, Result};

/// Service maintaining canonical asset identity.
pub struct AssetService {
    repository: Arc<dyn AssetRepositoryTrait>,
}

impl AssetService {
    pub fn new(repository: Arc<dyn AssetRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Inserts the asset on first sighting, otherwise merges the sighting's
    /// non-empty optional fields into the existing record and returns the
    /// existing identifier unchanged.
    pub async fn upsert(&self, sighting: NewAsset) -> Result<Asset> {
        if let Some(existing) = self
            .repository
            .find_by_symbol_and_type(&sighting.symbol, &sighting.asset_type)?
        {
            let update = AssetUpdate::from_sighting(&sighting);
            if update.is_empty() {
                debug!("asset {} already known, nothing to merge", existing.symbol);
                return Ok(existing);
            }
            return self.repository.apply_update(&existing.id, update).await;
        }

        match self.repository.create(sighting.clone()).await {
            Ok(asset) => {
                info!(
                    "created asset {} ({}) with id {}",
                    asset.symbol, asset.asset_type, asset.id
                );
                Ok(asset)
            }
            // Lost a create race with a concurrent load for the same symbol;
            // the winner's row is the canonical one.
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => self
                .repository
                .find_by_symbol_and_type(&sighting.symbol, &sighting.asset_type)?
                .ok_or_else(|| {
                    Error::Asset(format!(
                        "asset {} vanished after unique violation",
                        sighting.symbol
                    ))
                }),
            Err(e) => Err(e),
        }
    }

    /// Looks an asset up by its unique key without creating it.
    pub fn get_by_symbol_and_type(
        &self,
        symbol: &str,
        asset_type: &AssetType,
    ) -> Result<Option<Asset>> {
        self.repository.find_by_symbol_and_type(symbol, asset_type)
    }

    pub fn list(&self) -> Result<Vec<Asset>> {
        self.repository.list()
    }
}
