//! Scripted trade source for collector tests

use crate::market::{FetchError, TradeSource};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// Replays queued responses per market; an exhausted queue yields `[]`
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<HashMap<String, VecDeque<Result<Vec<Value>, FetchError>>>>,
    calls: Mutex<Vec<(String, usize)>>,
    stalled: Mutex<HashSet<String>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ok(&self, market: &str, trades: Vec<Value>) {
        self.push(market, Ok(trades));
    }

    pub(crate) fn push_err(&self, market: &str, err: FetchError) {
        self.push(market, Err(err));
    }

    /// Requests for `market` never complete
    pub(crate) fn stall(&self, market: &str) {
        self.stalled.lock().unwrap().insert(market.to_string());
    }

    fn push(&self, market: &str, response: Result<Vec<Value>, FetchError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(market.to_string())
            .or_default()
            .push_back(response);
    }

    pub(crate) fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TradeSource for ScriptedSource {
    async fn fetch_trades(&self, market_id: &str, limit: usize) -> Result<Vec<Value>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((market_id.to_string(), limit));
        let stalled = self.stalled.lock().unwrap().contains(market_id);
        if stalled {
            std::future::pending::<()>().await;
        }
        self.responses
            .lock()
            .unwrap()
            .get_mut(market_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
