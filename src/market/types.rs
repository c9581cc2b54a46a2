//! Trade record and fetch error types

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from a single trade API request. All of them are transient: the
/// market is skipped for the current cycle and retried on the next one.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure or timeout
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response
    #[error("Data API error: {status} - {body}")]
    Status { status: u16, body: String },
    /// Body is not a JSON array
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_timeout())
    }
}

/// A record that cannot be ingested
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TradeError {
    #[error("Trade record is not a JSON object")]
    NotAnObject,
    #[error("Trade record has no integer timestamp")]
    MissingTimestamp,
}

/// A trade as returned by the data API.
///
/// Only `timestamp` is interpreted; every other field is passed through to
/// the market log untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    timestamp: i64,
    fields: Map<String, Value>,
}

impl Trade {
    /// Timestamp in the unit used by the upstream API
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl TryFrom<Value> for Trade {
    type Error = TradeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(TradeError::NotAnObject);
        };
        let timestamp = fields
            .get("timestamp")
            .and_then(Value::as_i64)
            .ok_or(TradeError::MissingTimestamp)?;
        Ok(Self { timestamp, fields })
    }
}

impl Serialize for Trade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
