//! Authentication callout service binary entry point.

use anyhow::Result;
use callout_service::ServiceConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// NATS authentication callout service.
#[derive(Parser)]
#[command(name = "callout-service", version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yml")]
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::load(&cli.config)?;
    tracing::info!(path = %cli.config.display(), "loaded configuration");

    callout_service::service::run(config).await
}
