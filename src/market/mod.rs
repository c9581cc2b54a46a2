//! Trade data access
//!
//! Fetches recent trades per market from Polymarket's data API

mod data_api;
mod types;

pub use data_api::{DataApiClient, DataApiConfig};
pub use types::{FetchError, Trade, TradeError};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Source of raw trade records for a market
#[async_trait]
pub trait TradeSource: Send + Sync {
    /// Fetch up to `limit` of the most recent trades for `market_id`.
    ///
    /// Records are returned exactly as received; validation happens in the
    /// poller so that a malformed record is distinguishable from a failed
    /// request.
    async fn fetch_trades(&self, market_id: &str, limit: usize) -> Result<Vec<Value>, FetchError>;
}

#[async_trait]
impl<T: TradeSource + ?Sized> TradeSource for Arc<T> {
    async fn fetch_trades(&self, market_id: &str, limit: usize) -> Result<Vec<Value>, FetchError> {
        (**self).fetch_trades(market_id, limit).await
    }
}
