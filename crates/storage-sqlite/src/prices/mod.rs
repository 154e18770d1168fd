//! SQLite storage for price facts.

mod model;
mod repository;

pub use model::{PriceFactDB, DATE_FORMAT};
pub use repository::PriceRepository;
