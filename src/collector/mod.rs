//! Incremental trade collection
//!
//! The poller moves one market forward by one page of trades; the collector
//! drives the poller over every configured market, flushes the checkpoint and
//! sleeps.

mod poller;
mod scheduler;
mod types;

pub use poller::{select_new_trades, MarketPoller};
pub use scheduler::Collector;
pub use types::{CycleReport, MarketFailure, PollError, PollOutcome};

#[cfg(test)]
pub(crate) mod testing;
