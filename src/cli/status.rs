//! Status command implementation

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::data::MarketLog;
use chrono::{TimeZone, Utc};
use std::fmt::Write;

/// Render configured markets with their checkpoint and log file, followed by
/// any checkpointed markets that are no longer configured.
pub fn render_status(config: &Config, store: &CheckpointStore) -> String {
    let log = MarketLog::new(config.data.raw_dir());
    let mut out = String::new();

    let _ = writeln!(out, "poly-collector status");
    let _ = writeln!(out, "  Checkpoint: {}", store.path().display());
    let _ = writeln!(
        out,
        "  Poll interval: {}s, page limit: {}",
        config.collector.poll_interval_secs, config.collector.page_limit
    );

    for market in &config.collector.markets {
        let last_ts = store.get(market);
        let path = log.path_for(market);
        let lines = std::fs::read_to_string(&path)
            .map(|c| c.lines().count())
            .unwrap_or(0);
        let _ = writeln!(
            out,
            "  {}: last_ts={} ({}), {} logged trades in {}",
            market,
            last_ts,
            describe_timestamp(last_ts),
            lines,
            path.display()
        );
    }

    let orphaned: Vec<_> = store
        .markets()
        .filter(|(id, _)| !config.collector.markets.iter().any(|m| m.as_str() == *id))
        .collect();
    if !orphaned.is_empty() {
        let _ = writeln!(out, "  Not configured:");
        for (market, last_ts) in orphaned {
            let _ = writeln!(out, "    {}: last_ts={}", market, last_ts);
        }
    }

    out
}

/// Human-readable form of a checkpoint. The upstream unit is either seconds
/// or milliseconds, so large values are read as milliseconds.
fn describe_timestamp(ts: i64) -> String {
    if ts == 0 {
        return "never".to_string();
    }
    let parsed = if ts > 100_000_000_000 {
        Utc.timestamp_millis_opt(ts).single()
    } else {
        Utc.timestamp_opt(ts, 0).single()
    };
    parsed
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "invalid".to_string())
}
