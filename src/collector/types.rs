//! Collector result and error types

use crate::data::LogError;
use crate::market::FetchError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Result of polling one market
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// New trades were appended and the checkpoint advanced to `last_ts`
    Appended { count: usize, last_ts: i64 },
    /// Nothing newer than `since`; log and checkpoint untouched
    NoNewTrades { since: i64 },
}

/// Errors from polling one market
#[derive(Debug, Error)]
pub enum PollError {
    /// The request failed. Transient: skip the market this cycle.
    #[error("[{market}] fetch failed: {source}")]
    Fetch {
        market: String,
        #[source]
        source: FetchError,
    },
    /// The trades could not be written to the market log
    #[error("[{market}] append failed: {source}")]
    Append {
        market: String,
        #[source]
        source: LogError,
    },
}

impl PollError {
    /// Transient errors only affect this market for this cycle; anything
    /// else degrades the whole cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, PollError::Fetch { .. })
    }
}

/// A market that failed during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketFailure {
    pub market: String,
    pub error: String,
}

/// Summary of one cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    /// Markets whose poll completed, successfully or not
    pub markets_polled: usize,
    pub trades_appended: usize,
    /// Markets skipped because of a transient error
    pub failures: Vec<MarketFailure>,
    /// Set when a non-transient error cut the cycle short
    pub degraded: Option<MarketFailure>,
    /// Whether the end-of-cycle checkpoint flush succeeded
    pub flushed: bool,
}

impl CycleReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration: Duration::ZERO,
            markets_polled: 0,
            trades_appended: 0,
            failures: Vec::new(),
            degraded: None,
            flushed: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// No failures of any kind
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.degraded.is_none() && self.flushed
    }
}
