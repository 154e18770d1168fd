//! SQLite implementation of the gold dataset.

mod repository;

pub use repository::GoldRepository;
