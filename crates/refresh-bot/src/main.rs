//! Order refresher - entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use refresh_bot::config::DEFAULT_CONFIG_PATH;
use refresh_bot::{AppConfig, Application, Args, RunSummary};
use refresh_exchange::{DynExchangeClient, RestClient};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    refresh_telemetry::init_logging()?;

    info!("Starting order refresher v{}", env!("CARGO_PKG_VERSION"));

    let mode = args.mode()?;

    // CLI arg > REFRESH_CONFIG env var > default
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("REFRESH_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    info!(config_path = %config_path.display(), "Loading configuration");
    let config = AppConfig::load(&config_path).map_err(|e| {
        error!(%e, "Invalid configuration");
        e
    })?;

    let client: DynExchangeClient =
        Arc::new(RestClient::new(&config.exchange, config.credentials.clone())?);
    let app = Application::new(config, client)?;

    match app.run(mode).await {
        Ok(RunSummary::Batch { report, .. }) => {
            info!(
                action = %report.action,
                succeeded = report.succeeded,
                skipped = report.skipped,
                total = report.total,
                "Run finished"
            );
        }
        Ok(RunSummary::NothingToDo { .. }) => info!("Run finished"),
        Ok(RunSummary::Ladder(report)) => {
            info!(placed = report.placed.len(), failed = report.failed.len(), "Run finished");
        }
        Err(e) => {
            error!(%e, "Run failed");
            return Err(e.into());
        }
    }

    Ok(())
}
