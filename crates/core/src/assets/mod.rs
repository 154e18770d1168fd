//! Canonical asset identity.
//!
//! Assets are created on first sighting and merged on later sightings:
//! newly-supplied optional fields fill gaps, existing values are never
//! cleared. The asset id is the sole ownership key used by price facts.

mod model;
mod service;
mod traits;

pub use model::{Asset, AssetType, AssetUpdate, NewAsset};
pub use service::AssetService;
pub use traits::AssetRepositoryTrait;
