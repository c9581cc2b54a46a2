//! End-to-end collection tests against on-disk state

use crate::support::{log_timestamps, settings, start_collector, state_path, FixedSource};
use poly_collector::checkpoint::CheckpointStore;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_fresh_market_then_refetch() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FixedSource::default());
    let mut collector = start_collector(dir.path(), source.clone(), settings(&["0xabc"], false));

    source.set_page(
        "0xabc",
        vec![
            json!({"timestamp": 100, "price": 0.5}),
            json!({"timestamp": 90, "price": 0.4}),
        ],
    );
    let report = collector.run_cycle().await;
    assert_eq!(report.trades_appended, 2);
    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![100, 90]);
    assert_eq!(CheckpointStore::load(state_path(dir.path())).get("0xabc"), 100);

    source.set_page(
        "0xabc",
        vec![
            json!({"timestamp": 100, "price": 0.5}),
            json!({"timestamp": 95, "price": 0.45}),
        ],
    );
    let report = collector.run_cycle().await;
    assert_eq!(report.trades_appended, 0);
    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![100, 90]);
    assert_eq!(CheckpointStore::load(state_path(dir.path())).get("0xabc"), 100);
}

#[tokio::test]
async fn test_corrupt_checkpoint_starts_from_zero() {
    let dir = TempDir::new().unwrap();
    std::fs::write(state_path(dir.path()), "{\"markets\": {\"0xabc\": ").unwrap();

    let source = Arc::new(FixedSource::default());
    source.set_page("0xabc", vec![json!({"timestamp": 1}), json!({"timestamp": 0})]);
    source.set_page("0xdef", vec![json!({"timestamp": 3})]);

    let mut collector =
        start_collector(dir.path(), source, settings(&["0xabc", "0xdef"], false));
    assert!(collector.checkpoints().state().markets.is_empty());

    let report = collector.run_cycle().await;
    assert!(report.is_clean());
    // Only the trade at timestamp 0 is not strictly newer than the default
    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![1]);
    assert_eq!(log_timestamps(dir.path(), "0xdef"), vec![3]);

    let persisted = CheckpointStore::load(state_path(dir.path()));
    assert_eq!(persisted.get("0xabc"), 1);
    assert_eq!(persisted.get("0xdef"), 3);
}

#[tokio::test]
async fn test_restart_after_flush_does_not_duplicate() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FixedSource::default());
    source.set_page("0xabc", vec![json!({"timestamp": 100}), json!({"timestamp": 90})]);

    let mut first = start_collector(dir.path(), source.clone(), settings(&["0xabc"], false));
    first.run_cycle().await;
    drop(first);

    let mut restarted = start_collector(dir.path(), source.clone(), settings(&["0xabc"], false));
    assert_eq!(restarted.checkpoints().get("0xabc"), 100);
    let report = restarted.run_cycle().await;

    assert_eq!(report.trades_appended, 0);
    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![100, 90]);
}

/// Crash after the first market's batch is logged but before the
/// end-of-cycle flush. The restarted process re-reads the older checkpoint
/// and appends the same batch again: delivery is at-least-once.
#[tokio::test]
async fn test_crash_before_cycle_flush_reappends_batch() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FixedSource::default());
    source.set_page("0xabc", vec![json!({"timestamp": 100}), json!({"timestamp": 90})]);
    source.crash_on(Some("0xdef"));

    let mut collector =
        start_collector(dir.path(), source.clone(), settings(&["0xabc", "0xdef"], false));
    let crashed = tokio::spawn(async move { collector.run_cycle().await }).await;
    assert!(crashed.unwrap_err().is_panic());

    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![100, 90]);
    assert_eq!(CheckpointStore::load(state_path(dir.path())).get("0xabc"), 0);

    source.crash_on(None);
    let mut restarted =
        start_collector(dir.path(), source.clone(), settings(&["0xabc", "0xdef"], false));
    restarted.run_cycle().await;

    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![100, 90, 100, 90]);
    assert_eq!(CheckpointStore::load(state_path(dir.path())).get("0xabc"), 100);
}

#[tokio::test]
async fn test_flush_each_market_survives_crash_without_duplicates() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FixedSource::default());
    source.set_page("0xabc", vec![json!({"timestamp": 100}), json!({"timestamp": 90})]);
    source.crash_on(Some("0xdef"));

    let mut collector =
        start_collector(dir.path(), source.clone(), settings(&["0xabc", "0xdef"], true));
    let crashed = tokio::spawn(async move { collector.run_cycle().await }).await;
    assert!(crashed.unwrap_err().is_panic());

    assert_eq!(CheckpointStore::load(state_path(dir.path())).get("0xabc"), 100);

    source.crash_on(None);
    let mut restarted =
        start_collector(dir.path(), source.clone(), settings(&["0xabc", "0xdef"], true));
    restarted.run_cycle().await;

    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![100, 90]);
}

/// Only the newest `page_limit` trades are requested; older new trades
/// beyond the page are never collected.
#[tokio::test]
async fn test_trades_beyond_page_are_not_recovered() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FixedSource::default());
    source.set_page(
        "0xabc",
        (1..=5).rev().map(|ts| json!({"timestamp": ts})).collect(),
    );

    let mut config = settings(&["0xabc"], false);
    config.page_limit = 2;
    let mut collector = start_collector(dir.path(), source.clone(), config);

    collector.run_cycle().await;
    collector.run_cycle().await;

    assert_eq!(log_timestamps(dir.path(), "0xabc"), vec![5, 4]);
    assert_eq!(collector.checkpoints().get("0xabc"), 5);
}

#[tokio::test]
async fn test_passthrough_fields_preserved() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FixedSource::default());
    let trade = json!({
        "proxyWallet": "0x56687bf447db6ffa42ffe2204a05edaa20f55839",
        "side": "BUY",
        "conditionId": "0xabc",
        "size": 12.5,
        "price": 0.57,
        "timestamp": 1724100000,
        "transactionHash": "0xdeadbeef",
    });
    source.set_page("0xabc", vec![trade.clone()]);

    let mut collector = start_collector(dir.path(), source, settings(&["0xabc"], false));
    collector.run_cycle().await;

    let path = collector.poller().log().path_for("0xabc");
    let logged: serde_json::Value =
        serde_json::from_str(std::fs::read_to_string(path).unwrap().trim_end()).unwrap();
    assert_eq!(logged, trade);
}
