//! Batch lineage lifecycle against a real SQLite warehouse.

mod common;

use stockhaus_core::batches::{BatchMeta, BatchStatus};

fn meta(source_id: &str, name: &str) -> BatchMeta {
    BatchMeta {
        source_id: source_id.to_string(),
        batch_name: name.to_string(),
        file_path: Some("/data/AAPL.csv".to_string()),
        file_size_bytes: Some(4096),
        row_count: Some(250),
        quality_score: Some(97.5),
    }
}

#[tokio::test]
async fn open_persists_a_running_audit_row() {
    let warehouse = common::warehouse();
    let source = warehouse.sources.resolve_active("MANUAL_CSV").unwrap();

    let batch = warehouse
        .batches
        .open(meta(&source.id, "AAPL_20240102_093000"))
        .await
        .unwrap();

    let stored = warehouse.batches.get_by_id(&batch.id).unwrap().unwrap();
    assert_eq!(stored.status, BatchStatus::Running);
    assert_eq!(stored.quality_score, Some(97.5));
    assert_eq!(stored.row_count, Some(250));
    assert!(stored.finished_at.is_none());
}

#[tokio::test]
async fn finalize_stamps_status_end_time_and_row_count() {
    let warehouse = common::warehouse();
    let source = warehouse.sources.resolve_active("MANUAL_CSV").unwrap();
    let batch = warehouse
        .batches
        .open(meta(&source.id, "AAPL_20240102_093000"))
        .await
        .unwrap();

    warehouse
        .batches
        .finalize(&batch.id, BatchStatus::Success, None, Some(248))
        .await
        .unwrap();

    let stored = warehouse.batches.get_by_id(&batch.id).unwrap().unwrap();
    assert_eq!(stored.status, BatchStatus::Success);
    assert_eq!(stored.row_count, Some(248));
    assert!(stored.finished_at.is_some());
    assert!(stored.error_message.is_none());
}

#[tokio::test]
async fn failed_batch_keeps_its_error_and_declared_row_count() {
    let warehouse = common::warehouse();
    let source = warehouse.sources.resolve_active("MANUAL_CSV").unwrap();
    let batch = warehouse
        .batches
        .open(meta(&source.id, "AAPL_20240102_100000"))
        .await
        .unwrap();

    warehouse
        .batches
        .finalize(
            &batch.id,
            BatchStatus::Failed,
            Some("quality score 42.0 below acceptance threshold 75.0".to_string()),
            None,
        )
        .await
        .unwrap();

    let stored = warehouse.batches.get_by_id(&batch.id).unwrap().unwrap();
    assert_eq!(stored.status, BatchStatus::Failed);
    assert!(stored.error_message.as_deref().unwrap().contains("42.0"));
    // No final count given: the declared count stays.
    assert_eq!(stored.row_count, Some(250));
}

#[tokio::test]
async fn finalizing_a_missing_batch_errors() {
    let warehouse = common::warehouse();
    let result = warehouse
        .batches
        .finalize("no-such-batch", BatchStatus::Failed, None, None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn recent_batches_come_back_newest_first() {
    let warehouse = common::warehouse();
    let source = warehouse.sources.resolve_active("MANUAL_CSV").unwrap();

    for name in ["first", "second", "third"] {
        warehouse.batches.open(meta(&source.id, name)).await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let recent = warehouse.batches.list_recent(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent[0].started_at >= recent[1].started_at);
}
