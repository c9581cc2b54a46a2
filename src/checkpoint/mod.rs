//! Per-market ingestion checkpoints
//!
//! Tracks the newest trade timestamp appended for each market and persists
//! the mapping as a single JSON document.

mod store;

pub use store::{CheckpointState, CheckpointStore, MarketCheckpoint, StoreError};
