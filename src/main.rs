use anyhow::Context;
use clap::Parser;
use poly_collector::checkpoint::CheckpointStore;
use poly_collector::cli::{render_status, Cli, Commands};
use poly_collector::config::{Config, DEFAULT_CONFIG_PATH};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Missing markets or an unreadable config file is fatal
    let config = Config::from_file_and_env(cli.config.as_deref()).with_context(|| {
        let path = cli
            .config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        format!("Invalid configuration (config file: {})", path.display())
    })?;

    // Initialize telemetry
    let _telemetry = poly_collector::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting collector");
            args.execute(&config).await?;
        }
        Commands::Once(args) => {
            tracing::info!("Running a single collection cycle");
            args.execute(&config).await?;
        }
        Commands::Status => {
            let store = CheckpointStore::load(config.data.state_file());
            print!("{}", render_status(&config, &store));
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
