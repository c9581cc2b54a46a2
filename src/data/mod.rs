//! Trade log storage
//!
//! Appends newly observed trades to one JSONL file per market

mod market_log;

pub use market_log::{log_file_name, LogError, MarketLog};
