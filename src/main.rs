use anyhow::{Context, Result};
use cinderdash::cli::{self, args::Cli};
use cinderdash::{config::AppConfig, logging};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.global.config.as_deref(), Some(&cli.global))
        .context("Failed to load configuration")?;
    logging::init(config.log_config(cli.is_interactive()))
        .context("Failed to initialize logging")?;

    cli::run(cli, config).await
}
