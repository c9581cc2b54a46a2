//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

const TRADES_APPENDED: &str = "polycollector_trades_appended_total";
const FETCH_FAILURES: &str = "polycollector_fetch_failures_total";
const CYCLES: &str = "polycollector_cycles_total";
const CYCLE_DURATION: &str = "polycollector_cycle_duration_seconds";
const CHECKPOINT: &str = "polycollector_checkpoint_timestamp";

/// Serve `/metrics` on all interfaces. Must run inside the tokio runtime.
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Count trades appended to a market log
pub fn record_trades_appended(market: &str, count: usize) {
    ::metrics::counter!(TRADES_APPENDED, "market" => market.to_string()).increment(count as u64);
}

/// Count a failed fetch for a market
pub fn record_fetch_failure(market: &str) {
    ::metrics::counter!(FETCH_FAILURES, "market" => market.to_string()).increment(1);
}

/// Record a finished cycle
pub fn record_cycle(duration: Duration, degraded: bool) {
    let outcome = if degraded { "degraded" } else { "ok" };
    ::metrics::counter!(CYCLES, "outcome" => outcome).increment(1);
    ::metrics::histogram!(CYCLE_DURATION).record(duration.as_secs_f64());
}

/// Publish the current checkpoint of a market
pub fn set_checkpoint(market: &str, last_ts: i64) {
    ::metrics::gauge!(CHECKPOINT, "market" => market.to_string()).set(last_ts as f64);
}
