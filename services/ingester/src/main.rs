//! Building-sensor feed ingester service.
//!
//! Polls the sensor feed, reshapes the wide snapshot into the building
//! hierarchy, and persists it idempotently into PostgreSQL.

mod config;
mod ingest;
mod sources;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::IngesterConfig;
use ingest::IngestionPipeline;

#[derive(Parser, Debug)]
#[command(name = "ingester")]
#[command(about = "Building-sensor feed ingester")]
struct Args {
    /// Run once and exit (vs continuous polling)
    #[arg(long)]
    once: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting sensor feed ingester");

    let config = IngesterConfig::from_env()?;
    info!(feed_url = %config.feed_url, "Loaded configuration");

    let pipeline = IngestionPipeline::new(&config).await?;

    if args.once {
        info!("Running single ingestion cycle");
        pipeline.run_once().await?;
    } else {
        info!("Starting continuous polling");
        pipeline.run_forever().await?;
    }

    Ok(())
}
