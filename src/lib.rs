//! poly-collector: incremental trade collector for Polymarket markets
//!
//! This library provides the core components for:
//! - Fetching recent trades per market from the data API
//! - Filtering each page down to trades newer than the market's checkpoint
//! - Appending new trades to per-market JSONL logs
//! - Persisting per-market checkpoints atomically so restarts resume
//! - A sequential polling loop with per-market error isolation
//! - Structured logging and Prometheus metrics

pub mod checkpoint;
pub mod cli;
pub mod collector;
pub mod config;
pub mod data;
pub mod market;
pub mod telemetry;
