//! Once command implementation

use crate::collector::Collector;
use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Poll only these markets instead of the configured list
    #[arg(short, long)]
    pub market: Vec<String>,
}

impl OnceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if !self.market.is_empty() {
            config.collector.markets = self.market.clone();
            config.validate()?;
        }

        let mut collector = Collector::from_config(&config)?;
        let report = collector.run_cycle().await;

        tracing::info!(
            markets = report.markets_polled,
            trades = report.trades_appended,
            failures = report.failures.len(),
            elapsed_ms = report.duration.as_millis() as u64,
            "Cycle finished"
        );

        if let Some(failure) = report.degraded {
            anyhow::bail!("Cycle degraded at {}: {}", failure.market, failure.error);
        }
        if !report.flushed {
            anyhow::bail!("Checkpoint could not be persisted");
        }
        Ok(())
    }
}
