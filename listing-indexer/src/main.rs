//! Auction listing indexer
//!
//! Polls the store's auction managers on a fixed interval, keeps the
//! listings snapshot up to date and serves it over HTTP.

use anyhow::Result;
use clap::Parser;
use listing_indexer::adapters::{RpcAccountFetcher, SolanaAddressDeriver};
use listing_indexer::api;
use listing_indexer::config::IndexerConfig;
use listing_indexer::core::SnapshotStore;
use listing_indexer::{JsonSnapshotStore, ListingPipeline, PollingScheduler};
use listing_indexer::logging;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "listing-indexer")]
#[command(about = "Auction listing indexer")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "indexer.toml")]
    config: String,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Validate configuration, run one cycle without writing the snapshot, and exit
    #[arg(long)]
    dry_run: bool,

    /// Run a single cycle, commit it, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config_found = std::path::Path::new(&cli.config).exists();
    let mut config = if config_found {
        IndexerConfig::from_file(&cli.config)?
    } else {
        IndexerConfig::from_env()?
    };

    // Override log level if provided
    if let Some(log_level) = cli.log_level {
        config.monitoring.log_level = log_level;
    }

    // Initialize logging
    let _log_guard = init_logging(&config)?;
    if !config_found {
        warn!("Config file not found, using defaults and environment: {}", cli.config);
    }

    let programs = config.program_ids()?;
    let store_owner = config.store_owner()?;
    let config = Arc::new(config);

    info!("Starting listing indexer");
    info!("RPC endpoint: {}", config.rpc.endpoint);
    info!("Store owner: {}", store_owner);
    info!("Snapshot path: {:?}", config.snapshot.path);

    let fetcher = Arc::new(RpcAccountFetcher::new(
        config.rpc.endpoint.clone(),
        config.rpc.commitment.clone(),
        config.request_timeout(),
    ));
    let pipeline = Arc::new(ListingPipeline::new(
        fetcher,
        Arc::new(SolanaAddressDeriver),
        programs,
        store_owner,
        config.request_timeout(),
    ));
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonSnapshotStore::new(
        config.snapshot.path.clone(),
        config.snapshot.history_dir.clone(),
        config.snapshot.history_prefix.clone(),
        config.snapshot.change_detection,
    ));
    let scheduler = PollingScheduler::new(pipeline, store.clone(), config.poll_interval())
        .dry_run(cli.dry_run);

    if cli.dry_run || cli.once {
        let summary = scheduler.run_cycle().await?;
        info!(
            "Single cycle finished: {} listings from {} managers, {} skipped, commit: {:?}",
            summary.report.listings.len(),
            summary.report.managers_found,
            summary.report.skipped.len(),
            summary.commit
        );
        return Ok(());
    }

    if config.api.tls_enabled() {
        warn!("TLS material configured; terminate TLS in front of this service, it listens in plain HTTP");
    }

    // Start API server
    let api_server = api::start_server(store, &config.api).await?;

    let scheduler_handle = tokio::spawn(async move { scheduler.run().await });

    // Wait for shutdown signal
    info!("Indexer started successfully. Press Ctrl+C to shutdown.");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = scheduler_handle => {
            if let Err(e) = result {
                error!("Scheduler task error: {}", e);
            }
        }
        _ = api_server => {
            info!("API server finished");
        }
    }

    info!("Shutting down listing indexer");
    Ok(())
}

/// The returned guard flushes the log file when dropped
fn init_logging(config: &IndexerConfig) -> Result<Option<WorkerGuard>> {
    let log_level = config
        .monitoring
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("listing_indexer={},tower_http=info", log_level).into());

    let structured = config.monitoring.structured_logging;
    let json_layer = structured.then(|| fmt::layer().json());
    let plain_layer = (!structured).then(fmt::layer);

    let (file_layer, guard) = match &config.monitoring.log_dir {
        Some(dir) => {
            let (writer, guard) = logging::file_writer(
                dir,
                config.monitoring.log_max_bytes,
                config.monitoring.log_max_files,
            )?;
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
