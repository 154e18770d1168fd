//! Asset registry behavior against a real SQLite warehouse.

mod common;

use stockhaus_core::assets::{AssetType, NewAsset};

#[tokio::test]
async fn upsert_twice_returns_one_identifier() {
    let warehouse = common::warehouse();

    let first = warehouse
        .assets
        .upsert(NewAsset::new("TSLA", AssetType::Stock))
        .await
        .unwrap();
    let second = warehouse
        .assets
        .upsert(NewAsset::new("TSLA", AssetType::Stock))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(warehouse.assets.list().unwrap().len(), 1);
}

#[tokio::test]
async fn later_sighting_fills_gaps_without_clearing() {
    let warehouse = common::warehouse();

    let mut sighting = NewAsset::new("TSLA", AssetType::Stock);
    sighting.exchange = Some("NASDAQ".to_string());
    let created = warehouse.assets.upsert(sighting).await.unwrap();

    let mut later = NewAsset::new("TSLA", AssetType::Stock);
    later.sector = Some("Automotive".to_string());
    let merged = warehouse.assets.upsert(later).await.unwrap();

    assert_eq!(merged.id, created.id);
    assert_eq!(merged.exchange.as_deref(), Some("NASDAQ"));
    assert_eq!(merged.sector.as_deref(), Some("Automotive"));

    // And straight from the database, not just the returned value.
    let stored = warehouse
        .assets
        .get_by_symbol_and_type("TSLA", &AssetType::Stock)
        .unwrap()
        .unwrap();
    assert_eq!(stored.exchange.as_deref(), Some("NASDAQ"));
    assert_eq!(stored.sector.as_deref(), Some("Automotive"));
}

#[tokio::test]
async fn symbol_is_scoped_by_asset_type() {
    let warehouse = common::warehouse();

    let stock = warehouse
        .assets
        .upsert(NewAsset::new("GLD", AssetType::Stock))
        .await
        .unwrap();
    let etf = warehouse
        .assets
        .upsert(NewAsset::new("GLD", AssetType::Etf))
        .await
        .unwrap();

    assert_ne!(stock.id, etf.id);
    assert_eq!(warehouse.assets.list().unwrap().len(), 2);
}

#[tokio::test]
async fn lookup_without_create_returns_none_for_unknown() {
    let warehouse = common::warehouse();
    assert!(warehouse
        .assets
        .get_by_symbol_and_type("NOPE", &AssetType::Stock)
        .unwrap()
        .is_none());
}
