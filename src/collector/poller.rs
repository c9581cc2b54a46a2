//! Single-market polling step
//!
//! Fetch one page of recent trades, keep the ones strictly newer than the
//! market's checkpoint, append them to the market log and advance the
//! checkpoint to the newest timestamp appended.
//!
//! Only one page is requested per cycle. If more than `page_limit` trades
//! happened since the checkpoint, the older ones fall off the page and are
//! never collected.

use super::{PollError, PollOutcome};
use crate::checkpoint::CheckpointStore;
use crate::data::MarketLog;
use crate::market::{Trade, TradeSource};
use serde_json::Value;

/// Polls markets against a trade source and writes to their logs
pub struct MarketPoller<S> {
    source: S,
    log: MarketLog,
    page_limit: usize,
}

impl<S: TradeSource> MarketPoller<S> {
    pub fn new(source: S, log: MarketLog, page_limit: usize) -> Self {
        Self {
            source,
            log,
            page_limit,
        }
    }

    pub fn log(&self) -> &MarketLog {
        &self.log
    }

    /// Poll one market.
    ///
    /// The checkpoint is only advanced after the batch is on disk; any error
    /// leaves both the checkpoint and the log as they were.
    pub async fn poll(
        &self,
        market_id: &str,
        checkpoints: &mut CheckpointStore,
    ) -> Result<PollOutcome, PollError> {
        let since = checkpoints.get(market_id);

        let records = self
            .source
            .fetch_trades(market_id, self.page_limit)
            .await
            .map_err(|source| PollError::Fetch {
                market: market_id.to_string(),
                source,
            })?;
        let page_len = records.len();

        let fresh = select_new_trades(market_id, records, since);
        let Some(last_ts) = fresh.iter().map(Trade::timestamp).max() else {
            return Ok(PollOutcome::NoNewTrades { since });
        };

        if page_len >= self.page_limit && fresh.len() == page_len {
            tracing::warn!(
                market = market_id,
                page_limit = self.page_limit,
                since,
                "Whole page is new, older trades beyond the page may have been skipped"
            );
        }

        let count = self
            .log
            .append(market_id, &fresh)
            .map_err(|source| PollError::Append {
                market: market_id.to_string(),
                source,
            })?;
        checkpoints.set(market_id, last_ts);

        Ok(PollOutcome::Appended { count, last_ts })
    }
}

/// Keep the records with `timestamp > since`, preserving order.
///
/// Records that are not objects or lack an integer `timestamp` cannot be
/// ordered against the checkpoint; they are logged and dropped.
pub fn select_new_trades(market_id: &str, records: Vec<Value>, since: i64) -> Vec<Trade> {
    let mut fresh = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        match Trade::try_from(record) {
            Ok(trade) if trade.timestamp() > since => fresh.push(trade),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(market = market_id, index, error = %e, "Dropping malformed trade record");
            }
        }
    }
    fresh
}
