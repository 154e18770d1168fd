//! Whole-pipeline runs over real CSV files and a real SQLite warehouse.

mod common;

use stockhaus_core::batches::BatchStatus;
use stockhaus_core::errors::Error;
use stockhaus_core::gold::{GoldStore, DAILY_GOLD_VIEW};
use stockhaus_core::pipeline::LoadRequest;
use stockhaus_core::prices::PriceStore;

#[tokio::test]
async fn clean_file_flows_from_csv_to_facts() {
    let warehouse = common::warehouse();
    let path = warehouse.write_csv("AAPL.csv", common::CLEAN_AAPL_CSV);

    let report = warehouse
        .pipeline()
        .load_file(&LoadRequest::new(path, "MANUAL_CSV"))
        .await
        .unwrap();

    assert_eq!(report.symbol, "AAPL");
    assert_eq!(report.staged_rows, 3);
    assert_eq!(report.outcome.as_ref().unwrap().inserted, 3);
    assert!(report.quality.quality_score >= 90.0);

    let batch = warehouse
        .batches
        .get_by_id(report.batch_id.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(batch.status, BatchStatus::Success);
    assert_eq!(batch.row_count, Some(3));
    assert!(batch.file_path.is_some());
}

#[tokio::test]
async fn gate_rejection_writes_a_failed_batch_and_no_facts() {
    let warehouse = common::warehouse();
    let path = warehouse.write_csv(
        "JUNK.csv",
        "Date,Open,High,Low,Close\n\
         garbage,one,two,three,four\n\
         rubbish,five,six,seven,eight\n",
    );

    let result = warehouse
        .pipeline()
        .load_file(&LoadRequest::new(path, "MANUAL_CSV"))
        .await;
    assert!(matches!(result, Err(Error::QualityGate { .. })));

    let recent = warehouse.batches.list_recent(10).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].status, BatchStatus::Failed);
    assert!(recent[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("below acceptance threshold"));

    // No asset was registered and no facts were written.
    assert!(warehouse.assets.list().unwrap().is_empty());
    assert!(warehouse.prices.latest_fact_created_at().unwrap().is_none());
}

#[tokio::test]
async fn structural_failure_leaves_no_trace() {
    let warehouse = common::warehouse();
    let request = LoadRequest::new(warehouse.dir.join("MISSING.csv"), "MANUAL_CSV");

    let result = warehouse.pipeline().load_file(&request).await;

    assert!(matches!(result, Err(Error::Structural(_))));
    assert!(warehouse.batches.list_recent(10).unwrap().is_empty());
}

#[tokio::test]
async fn bulk_run_loads_everything_and_refreshes_gold() {
    let warehouse = common::warehouse();
    let files = vec![
        warehouse.write_csv("AAPL.csv", common::CLEAN_AAPL_CSV),
        warehouse.write_csv(
            "MSFT.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-02,390.0,392.0,389.0,391.0,500000\n\
             2024-01-03,391.0,393.0,390.0,392.0,450000\n",
        ),
    ];

    let summary = warehouse
        .bulk_runner()
        .run(files, "MANUAL_CSV", true)
        .await
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.records_loaded, 5);
    // The unconditional final refresh ran.
    assert!(summary.refreshes >= 1);

    let stats = warehouse.gold.view_stats(DAILY_GOLD_VIEW).unwrap();
    assert_eq!(stats.row_count, 5);
    assert_eq!(stats.symbol_count, 2);
}

#[tokio::test]
async fn bulk_run_skips_symbols_the_source_already_loaded() {
    let warehouse = common::warehouse();
    let first = vec![warehouse.write_csv("AAPL.csv", common::CLEAN_AAPL_CSV)];
    warehouse
        .bulk_runner()
        .run(first, "MANUAL_CSV", true)
        .await
        .unwrap();

    // Second dispatch sees AAPL in the skip-set and only loads MSFT.
    let second = vec![
        warehouse.write_csv("AAPL.csv", common::CLEAN_AAPL_CSV),
        warehouse.write_csv(
            "MSFT.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-02,390.0,392.0,389.0,391.0,500000\n",
        ),
    ];
    let summary = warehouse
        .bulk_runner()
        .run(second, "MANUAL_CSV", true)
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.records_loaded, 1);
}

#[tokio::test]
async fn failures_do_not_abort_the_rest_of_a_bulk_run() {
    let warehouse = common::warehouse();
    let files = vec![
        warehouse.dir.join("GONE.csv"),
        warehouse.write_csv("AAPL.csv", common::CLEAN_AAPL_CSV),
    ];

    let summary = warehouse
        .bulk_runner()
        .run(files, "MANUAL_CSV", false)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("GONE.csv"));
}

#[tokio::test]
async fn inactive_source_refuses_the_whole_run() {
    let warehouse = common::warehouse();

    // Sources are seeded by migrations; deactivate one directly.
    {
        use diesel::prelude::*;
        use stockhaus_storage_sqlite::schema::data_sources;
        let mut conn = stockhaus_storage_sqlite::get_connection(&warehouse.pool).unwrap();
        diesel::update(data_sources::table.filter(data_sources::source_name.eq("MANUAL_CSV")))
            .set(data_sources::is_active.eq(false))
            .execute(&mut conn)
            .unwrap();
    }

    let path = warehouse.write_csv("AAPL.csv", common::CLEAN_AAPL_CSV);
    let result = warehouse
        .pipeline()
        .load_file(&LoadRequest::new(path, "MANUAL_CSV"))
        .await;

    assert!(matches!(result, Err(Error::Source(_))));
}
