//! SQLite storage for batch lineage.

mod model;
mod repository;

pub use model::BatchDB;
pub use repository::BatchRepository;
