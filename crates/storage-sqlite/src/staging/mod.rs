//! SQLite storage for the staging working area.

mod model;
mod repository;

pub use model::StagedRowDB;
pub use repository::StagingRepository;
