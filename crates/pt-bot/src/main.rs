use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pt_bot::{Cli, Config, runtime};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let bot = runtime::Bot::new(&config).with_context(|| {
        format!("failed to load playtime data from {}", config.data_file.display())
    })?;
    tracing::info!(
        data_file = %config.data_file.display(),
        games = ?config.tracked_games,
        "playtime bot ready"
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    runtime::run(
        bot,
        stdin,
        stdout,
        Duration::from_secs(config.tick_interval_secs),
    )
    .await
}
