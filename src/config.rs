//! Configuration types for poly-collector
//!
//! Loaded once at startup from a TOML file, then overridden by the
//! `POLYMARKET_*` environment variables. The resulting value is immutable
//! and handed to the collector by reference.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file read when `--config` is not given. Optional.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default Polymarket data API base URL
pub const DATA_API_URL: &str = "https://data-api.polymarket.com";

/// Comma-separated market identifiers
pub const ENV_MARKETS: &str = "POLYMARKET_MARKETS";
/// Base directory for checkpoint and trade logs
pub const ENV_DATA_DIR: &str = "POLYMARKET_DATA_DIR";
/// Poll interval in seconds
pub const ENV_POLL_SECONDS: &str = "POLYMARKET_POLL_SECONDS";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("No markets configured. Set collector.markets or POLYMARKET_MARKETS (comma-separated condition ids)")]
    NoMarkets,
    #[error("Poll interval must be a positive number of seconds")]
    InvalidPollInterval,
    #[error("Page limit must be positive")]
    InvalidPageLimit,
    #[error("Request timeout must be positive")]
    InvalidTimeout,
    #[error("Market id {0:?} may only contain ASCII letters, digits, '_', '-' and '.'")]
    InvalidMarketId(String),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Polling loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorConfig {
    /// Market condition ids, polled in this order every cycle
    #[serde(default)]
    pub markets: Vec<String>,

    /// Sleep between cycles (seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum number of trades requested per market per cycle
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Persist the checkpoint after every market that appended trades,
    /// in addition to the end-of-cycle flush
    #[serde(default)]
    pub flush_each_market: bool,
}

fn default_poll_interval_secs() -> u64 {
    60
}
fn default_page_limit() -> usize {
    1000
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            markets: Vec::new(),
            poll_interval_secs: default_poll_interval_secs(),
            page_limit: default_page_limit(),
            flush_each_market: false,
        }
    }
}

impl CollectorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Trade data API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DATA_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!("poly-collector/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Storage locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/data")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    /// Checkpoint file: `<data_dir>/state.json`
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    /// Directory holding the per-market trade logs
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the config file, apply environment overrides and validate.
    ///
    /// An explicit `path` must exist. Without one, `config.toml` is read if
    /// present and defaults are used otherwise.
    pub fn from_file_and_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_file_and_env`] with a custom variable lookup
    pub fn from_sources<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `POLYMARKET_*` overrides from the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MARKETS) {
            let markets = parse_market_list(&raw);
            if !markets.is_empty() {
                self.collector.markets = markets;
            }
        }

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            self.data.data_dir = PathBuf::from(dir.trim());
        }

        if let Some(raw) = lookup(ENV_POLL_SECONDS) {
            self.collector.poll_interval_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_POLL_SECONDS,
                    value: raw.clone(),
                })?;
        }

        Ok(())
    }

    /// Check the invariants the collector relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector.markets.is_empty() {
            return Err(ConfigError::NoMarkets);
        }
        if let Some(bad) = self
            .collector
            .markets
            .iter()
            .find(|m| !is_valid_market_id(m))
        {
            return Err(ConfigError::InvalidMarketId(bad.clone()));
        }
        if self.collector.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        if self.collector.page_limit == 0 {
            return Err(ConfigError::InvalidPageLimit);
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Market ids double as log file names, so they are limited to characters
/// that are safe in a single path component and never rewritten.
pub fn is_valid_market_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Split a comma-separated market list, dropping blanks
pub fn parse_market_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}
