//! CLI interface for poly-collector
//!
//! Provides subcommands for:
//! - `run`: Poll all configured markets until interrupted
//! - `once`: Run a single collection cycle
//! - `status`: Show per-market checkpoints
//! - `config`: Show the effective configuration

mod once;
mod run;
mod status;

pub use once::OnceArgs;
pub use run::RunArgs;
pub use status::render_status;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "poly-collector")]
#[command(about = "Incremental trade collector for Polymarket markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file [default: config.toml, if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll all configured markets until interrupted
    Run(RunArgs),
    /// Run a single collection cycle and exit
    Once(OnceArgs),
    /// Show per-market checkpoints and log files
    Status,
    /// Show the effective configuration
    Config,
}
