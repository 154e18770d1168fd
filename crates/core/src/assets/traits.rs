//! Asset repository trait.

use async_trait::async_trait;

use super::model::{Asset, AssetType, AssetUpdate, NewAsset};
use crate::errors::Result;

/// Storage interface for assets.
#[async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    /// Looks an asset up by its unique (symbol, asset_type) key.
    fn find_by_symbol_and_type(
        &self,
        symbol: &str,
        asset_type: &AssetType,
    ) -> Result<Option<Asset>>;

    /// Inserts a new asset and returns it with its generated identifier.
    async fn create(&self, new_asset: NewAsset) -> Result<Asset>;

    /// Applies a coalescing metadata update: only the update's `Some`
    /// fields are written, existing values are never nulled out.
    async fn apply_update(&self, asset_id: &str, update: AssetUpdate) -> Result<Asset>;

    /// Lists all known assets.
    fn list(&self) -> Result<Vec<Asset>>;
}
