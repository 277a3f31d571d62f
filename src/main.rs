use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_aggregator::{
    catalog::load_catalog,
    config::Config,
    ingestor::load_sources,
    output::{write_playlist, M3uFileSink},
    pipeline::Aggregator,
};

#[derive(Parser)]
#[command(name = "m3u-aggregator")]
#[command(version = "0.1.0")]
#[command(about = "Builds one LCN-ordered M3U playlist from many upstream playlists")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Channel catalog JSON (overrides config file)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// File listing playlist URLs, one per line (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    sources: Option<PathBuf>,

    /// Output playlist path (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Channels validated in parallel
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Enable containment matching when an exact name lookup fails
    #[arg(long)]
    fuzzy: bool,

    /// Skip stream probing and keep the highest-priority candidate
    #[arg(long)]
    no_validate: bool,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_aggregator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Aggregator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(catalog) = cli.catalog {
        config.catalog.path = catalog;
    }
    if let Some(sources) = cli.sources {
        config.sources.list_file = Some(sources);
    }
    if let Some(output) = cli.output {
        config.output.path = output;
    }
    if let Some(concurrency) = cli.concurrency {
        config.validation.concurrency = concurrency;
    }
    if cli.fuzzy {
        config.matching.fuzzy = true;
    }
    if cli.no_validate {
        config.validation.enabled = false;
    }
    if cli.insecure {
        config.http.accept_invalid_certs = true;
    }
    config.validate()?;

    if config.http.accept_invalid_certs {
        warn!("TLS certificate validation is disabled");
    }

    // Catalog problems are fatal before anything is fetched
    let records = load_catalog(&config.catalog.path).await?;
    let aggregator = Aggregator::from_config(&config, records)?;
    let sources = load_sources(&config.sources).await?;

    let summary = aggregator.run(&sources).await;
    summary.log();

    if summary.records.is_empty() {
        warn!("No channels survived; writing an empty playlist");
    }

    let mut sink = M3uFileSink::create(&config.output.path)?;
    write_playlist(&mut sink, &summary.records)?;

    Ok(())
}
