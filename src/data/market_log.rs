//! Append-only per-market trade logs

use crate::market::Trade;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Trade log write errors
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to serialize trade: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to append to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes trades to `<raw_dir>/trades_<market>.jsonl`.
///
/// Files are opened per append and closed right after; nothing is held
/// between cycles.
#[derive(Debug, Clone)]
pub struct MarketLog {
    raw_dir: PathBuf,
}

impl MarketLog {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    /// Log file path for a market
    pub fn path_for(&self, market_id: &str) -> PathBuf {
        self.raw_dir.join(log_file_name(market_id))
    }

    /// Append `trades` in order, one JSON object per line.
    ///
    /// The whole batch is serialized up front and handed to a single write on
    /// an append-mode file, so a serialization failure writes nothing. An
    /// empty batch does not touch the file system.
    pub fn append(&self, market_id: &str, trades: &[Trade]) -> Result<usize, LogError> {
        if trades.is_empty() {
            return Ok(0);
        }

        let mut buf = Vec::with_capacity(trades.len() * 256);
        for trade in trades {
            serde_json::to_writer(&mut buf, trade)?;
            buf.push(b'\n');
        }

        let path = self.path_for(market_id);
        let io_err = |source| LogError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.raw_dir).map_err(io_err)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        file.write_all(&buf).map_err(io_err)?;
        file.sync_data().map_err(io_err)?;

        tracing::debug!(market = market_id, count = trades.len(), path = %path.display(), "Appended trades");
        Ok(trades.len())
    }
}

/// Deterministic file name for a market's log.
///
/// Characters outside `[A-Za-z0-9_.-]` become `_` so the id cannot escape the
/// log directory. The mapping is not injective (`a/b` and `a_b` share a
/// file), which is why configured market ids are restricted to the safe set
/// in `Config::validate`; for those ids the name is the id verbatim.
pub fn log_file_name(market_id: &str) -> String {
    let safe: String = market_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("trades_{}.jsonl", safe)
}
