//! Collection loop
//!
//! One cycle polls every configured market in order, then flushes the
//! checkpoint. The loop sleeps `poll_interval` between cycles and only stops
//! when the shutdown future resolves.

use super::{CycleReport, MarketFailure, MarketPoller, PollOutcome};
use crate::checkpoint::CheckpointStore;
use crate::config::{CollectorConfig, Config};
use crate::data::MarketLog;
use crate::market::{DataApiClient, DataApiConfig, TradeSource};
use crate::telemetry;
use anyhow::Context;
use chrono::Utc;
use std::future::Future;
use std::time::Instant;

/// Drives the poller over all markets and owns the checkpoint store
pub struct Collector<S> {
    settings: CollectorConfig,
    poller: MarketPoller<S>,
    checkpoints: CheckpointStore,
}

impl Collector<DataApiClient> {
    /// Build a collector against the live data API.
    ///
    /// Creates the log directory and loads the checkpoint. Fails only if the
    /// directory cannot be created or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let raw_dir = config.data.raw_dir();
        std::fs::create_dir_all(&raw_dir)
            .with_context(|| format!("Failed to create data directory {}", raw_dir.display()))?;

        let client = DataApiClient::with_config(DataApiConfig::from(&config.api))
            .context("Failed to build HTTP client")?;
        let poller = MarketPoller::new(client, MarketLog::new(raw_dir), config.collector.page_limit);
        let checkpoints = CheckpointStore::load(config.data.state_file());

        Ok(Self::new(config.collector.clone(), poller, checkpoints))
    }
}

impl<S: TradeSource> Collector<S> {
    pub fn new(settings: CollectorConfig, poller: MarketPoller<S>, checkpoints: CheckpointStore) -> Self {
        Self {
            settings,
            poller,
            checkpoints,
        }
    }

    pub fn markets(&self) -> &[String] {
        &self.settings.markets
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn poller(&self) -> &MarketPoller<S> {
        &self.poller
    }

    /// Run one full pass over the configured markets.
    ///
    /// Transient errors skip the failing market. Any other error stops the
    /// pass early. The checkpoint is flushed in every case since it only
    /// holds timestamps of batches already written.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::new(Utc::now());

        for market in &self.settings.markets {
            let result = self.poller.poll(market, &mut self.checkpoints).await;
            report.markets_polled += 1;

            match result {
                Ok(PollOutcome::Appended { count, last_ts }) => {
                    tracing::info!(market = %market, count, last_ts, "Fetched new trades");
                    report.trades_appended += count;
                    telemetry::record_trades_appended(market, count);
                    telemetry::set_checkpoint(market, last_ts);

                    if self.settings.flush_each_market {
                        flush_checkpoints(&mut self.checkpoints);
                    }
                }
                Ok(PollOutcome::NoNewTrades { since }) => {
                    tracing::info!(market = %market, since, "No new trades");
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(market = %market, error = %e, "Request error, skipping market this cycle");
                    telemetry::record_fetch_failure(market);
                    report.failures.push(MarketFailure {
                        market: market.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!(market = %market, error = %e, "Unexpected error, abandoning cycle");
                    report.degraded = Some(MarketFailure {
                        market: market.clone(),
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        report.flushed = flush_checkpoints(&mut self.checkpoints);
        report.duration = started.elapsed();
        telemetry::record_cycle(report.duration, report.is_degraded());

        tracing::debug!(
            started_at = %report.started_at.to_rfc3339(),
            markets = report.markets_polled,
            trades = report.trades_appended,
            failures = report.failures.len(),
            degraded = report.is_degraded(),
            elapsed_ms = report.duration.as_millis() as u64,
            "Cycle complete"
        );

        report
    }

    /// Run cycles until `shutdown` resolves.
    ///
    /// Shutdown is honoured during a cycle or the sleep after it. A cycle
    /// interrupted at a fetch has not touched the log or checkpoint for that
    /// market, so the final flush below persists a consistent state.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(markets = ?self.settings.markets, "Starting collector");
        tracing::info!(
            interval_secs = self.settings.poll_interval_secs,
            "Polling every {} seconds",
            self.settings.poll_interval_secs
        );

        let interval = self.settings.poll_interval();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.run_cycle() => {}
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        tracing::info!("Shutdown requested, flushing checkpoint");
        flush_checkpoints(&mut self.checkpoints);
    }
}

/// Flush and log on failure; the store stays dirty and is retried next time
fn flush_checkpoints(checkpoints: &mut CheckpointStore) -> bool {
    match checkpoints.flush() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist checkpoint");
            false
        }
    }
}
