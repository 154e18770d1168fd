//! Price fact loading.
//!
//! The loader turns staged rows into validated price records and persists
//! them idempotently: the upsert key is (asset, price date, source,
//! granularity) and a conflict overwrites every value field plus the
//! lineage columns - last write wins, no history retained.

mod loader;
mod model;
mod store;

pub use loader::PriceLoader;
pub use model::{
    Granularity, LoadOutcome, PriceRecord, RejectReason, Rejection, RowOutcome,
    ValidatedPriceRow,
};
pub use store::{PriceStore, UpsertReport};
