//! Checkpoint store backed by a JSON file
//!
//! On-disk format:
//!
//! ```json
//! {"markets": {"<condition_id>": {"last_ts": 1700000000}}}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Checkpoint persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize checkpoint: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write checkpoint {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress for a single market
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketCheckpoint {
    /// Newest trade timestamp appended to the market log
    #[serde(default)]
    pub last_ts: i64,
}

/// Full persisted checkpoint document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointState {
    #[serde(default)]
    pub markets: BTreeMap<String, MarketCheckpoint>,
}

/// In-memory checkpoint with write-through to a JSON file on `flush`.
///
/// Single writer: the collector loop owns the store and mutates it through
/// `&mut self`, so no locking is involved.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    state: CheckpointState,
    dirty: bool,
}

impl CheckpointStore {
    /// Load the checkpoint at `path`.
    ///
    /// Never fails: a missing file starts empty, an unreadable or corrupt one
    /// is logged and also starts empty. In the corrupt case the store is
    /// marked dirty so the next flush replaces the bad file.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let (state, dirty) = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<CheckpointState>(&bytes) {
                Ok(state) => {
                    tracing::info!(
                        path = %path.display(),
                        markets = state.markets.len(),
                        "Loaded checkpoint"
                    );
                    (state, false)
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Checkpoint is corrupt, starting from empty state"
                    );
                    (CheckpointState::default(), true)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No checkpoint found, starting fresh");
                (CheckpointState::default(), false)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Checkpoint unreadable, starting from empty state"
                );
                (CheckpointState::default(), true)
            }
        };

        Self { path, state, dirty }
    }

    /// Last ingested timestamp for `market_id`, `0` if unknown
    pub fn get(&self, market_id: &str) -> i64 {
        self.state
            .markets
            .get(market_id)
            .map(|c| c.last_ts)
            .unwrap_or(0)
    }

    /// Advance the checkpoint for `market_id`.
    ///
    /// Values lower than the current one are ignored so the checkpoint never
    /// moves backwards.
    pub fn set(&mut self, market_id: &str, timestamp: i64) {
        let current = self.get(market_id);
        if timestamp < current {
            tracing::warn!(
                market = market_id,
                current,
                requested = timestamp,
                "Ignoring checkpoint regression"
            );
            return;
        }
        if timestamp == current && self.state.markets.contains_key(market_id) {
            return;
        }

        self.state
            .markets
            .insert(market_id.to_string(), MarketCheckpoint { last_ts: timestamp });
        self.dirty = true;
    }

    /// Persist the full mapping, replacing the previous file atomically.
    ///
    /// The document is written to a temporary file in the same directory,
    /// synced, then renamed over the target. On error the previous file is
    /// left as it was and the store stays dirty.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        let bytes = serde_json::to_vec(&self.state)?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        self.dirty = false;
        tracing::debug!(
            path = %self.path.display(),
            markets = self.state.markets.len(),
            "Checkpoint flushed"
        );
        Ok(())
    }

    /// Whether memory holds changes not yet flushed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current checkpoints, ordered by market id
    pub fn markets(&self) -> impl Iterator<Item = (&str, i64)> {
        self.state
            .markets
            .iter()
            .map(|(id, c)| (id.as_str(), c.last_ts))
    }

    pub fn state(&self) -> &CheckpointState {
        &self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
