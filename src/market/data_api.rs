//! Data API client for trade history
//!
//! Wraps `GET /trades?market=<condition_id>&limit=<n>` on Polymarket's data
//! API. The endpoint returns the most recent trades first, so a single
//! request only ever sees a bounded page of history.

use super::{FetchError, TradeSource};
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Configuration for the data API client
#[derive(Debug, Clone)]
pub struct DataApiConfig {
    /// Base URL for the data API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl From<&ApiConfig> for DataApiConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            timeout: api.timeout(),
            user_agent: api.user_agent.clone(),
        }
    }
}

/// Client for Polymarket's data API
pub struct DataApiClient {
    config: DataApiConfig,
    client: Client,
}

impl DataApiClient {
    /// Create a client with custom configuration
    pub fn with_config(config: DataApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    /// Full URL of the trades endpoint
    pub fn trades_url(&self) -> String {
        format!("{}/trades", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TradeSource for DataApiClient {
    async fn fetch_trades(&self, market_id: &str, limit: usize) -> Result<Vec<Value>, FetchError> {
        let url = self.trades_url();

        tracing::debug!(url = %url, market = market_id, limit, "Fetching trades from data API");

        let response = self
            .client
            .get(&url)
            .query(&[("market", market_id.to_string()), ("limit", limit.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        parse_trades_body(&body)
    }
}

/// Decode a trades response body into raw records
fn parse_trades_body(body: &[u8]) -> Result<Vec<Value>, FetchError> {
    serde_json::from_slice::<Vec<Value>>(body).map_err(|e| FetchError::Decode(e.to_string()))
}

impl std::fmt::Debug for DataApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataApiClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
