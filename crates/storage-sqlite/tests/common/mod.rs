//! Shared fixtures for integration tests.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use stockhaus_core::assets::AssetService;
use stockhaus_core::batches::BatchTracker;
use stockhaus_core::config::IngestConfig;
use stockhaus_core::gold::{FreshnessCheck, RefreshCoordinator};
use stockhaus_core::pipeline::{BulkRunner, IngestPipeline};
use stockhaus_core::prices::PriceLoader;
use stockhaus_core::sources::SourceService;
use stockhaus_core::staging::StagingArea;
use stockhaus_storage_sqlite::assets::AssetRepository;
use stockhaus_storage_sqlite::batches::BatchRepository;
use stockhaus_storage_sqlite::db::{self, DbPool, WriteHandle};
use stockhaus_storage_sqlite::gold::GoldRepository;
use stockhaus_storage_sqlite::prices::PriceRepository;
use stockhaus_storage_sqlite::sources::SourceRepository;
use stockhaus_storage_sqlite::staging::StagingRepository;

/// A migrated throwaway database plus every wired service.
pub struct Warehouse {
    pub pool: DbPool,
    pub writer: WriteHandle,
    pub config: IngestConfig,
    pub staging: Arc<StagingArea>,
    pub staging_repo: Arc<StagingRepository>,
    pub sources: Arc<SourceService>,
    pub assets: Arc<AssetService>,
    pub asset_repo: Arc<AssetRepository>,
    pub batches: Arc<BatchTracker>,
    pub batch_repo: Arc<BatchRepository>,
    pub prices: Arc<PriceRepository>,
    pub loader: Arc<PriceLoader>,
    pub gold: Arc<GoldRepository>,
    pub refresher: Arc<RefreshCoordinator>,
    pub dir: PathBuf,
    _tempdir: tempfile::TempDir,
}

impl Warehouse {
    pub fn pipeline(&self) -> Arc<IngestPipeline> {
        Arc::new(IngestPipeline::new(
            self.config.clone(),
            self.staging.clone(),
            self.sources.clone(),
            self.assets.clone(),
            self.batches.clone(),
            self.loader.clone(),
        ))
    }

    pub fn bulk_runner(&self) -> BulkRunner {
        BulkRunner::new(
            self.config.clone(),
            self.pipeline(),
            self.sources.clone(),
            self.prices.clone(),
            self.refresher.clone(),
        )
    }

    pub fn freshness(&self) -> FreshnessCheck {
        FreshnessCheck::new(self.gold.clone(), self.prices.clone())
    }

    /// Writes a CSV fixture into the warehouse's scratch directory.
    pub fn write_csv(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }
}

/// Spins up a fresh warehouse on a temp-file SQLite database.
///
/// Must run inside a tokio runtime; the writer actor is a spawned task.
pub fn warehouse() -> Warehouse {
    warehouse_with(IngestConfig::default())
}

pub fn warehouse_with(config: IngestConfig) -> Warehouse {
    let tempdir = tempfile::tempdir().unwrap();
    let db_path = tempdir.path().join("warehouse.db");
    let pool = db::init(db_path.to_str().unwrap()).unwrap();
    let writer = db::spawn_writer(pool.clone());

    let staging_repo = Arc::new(StagingRepository::new(pool.clone(), writer.clone()));
    let asset_repo = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let batch_repo = Arc::new(BatchRepository::new(pool.clone(), writer.clone()));
    let prices = Arc::new(PriceRepository::new(pool.clone(), writer.clone()));
    let gold = Arc::new(GoldRepository::new(pool.clone(), writer.clone()));

    Warehouse {
        staging: Arc::new(StagingArea::new(staging_repo.clone())),
        sources: Arc::new(SourceService::new(Arc::new(SourceRepository::new(
            pool.clone(),
        )))),
        assets: Arc::new(AssetService::new(asset_repo.clone())),
        batches: Arc::new(BatchTracker::new(batch_repo.clone())),
        loader: Arc::new(PriceLoader::new(prices.clone(), &config)),
        refresher: Arc::new(RefreshCoordinator::new(gold.clone())),
        staging_repo,
        asset_repo,
        batch_repo,
        prices,
        gold,
        config,
        dir: tempdir.path().to_path_buf(),
        pool,
        writer,
        _tempdir: tempdir,
    }
}

/// A small, fully valid Yahoo-style daily bar file.
pub const CLEAN_AAPL_CSV: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n\
    2024-01-02,100.0,102.0,99.0,101.0,100.5,1000000\n\
    2024-01-03,101.0,103.0,100.0,102.0,101.5,900000\n\
    2024-01-04,102.0,104.0,101.0,103.0,102.5,800000\n";
