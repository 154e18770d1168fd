//! SQLite storage for data sources.

mod model;
mod repository;

pub use model::DataSourceDB;
pub use repository::SourceRepository;
