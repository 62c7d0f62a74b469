mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channelfeed_core::indexer::ALL_TRACKERS;
use channelfeed_core::{
    validate_config, ChannelClient, FeedSyncer, Indexer, JackettIndexer, SanitizedConfig,
    SyncSettings, TriblerClient,
};

use cli::{Cli, LogFormat};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config = cli.into_config();
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!(config = %sanitized, "Configuration loaded");

    let jackett = JackettIndexer::new(&config.jackett, config.search.clone())
        .context("Failed to create Jackett client")?;

    // Unreachable Jackett is not fatal; the fetch loop keeps retrying
    match jackett.probe(ALL_TRACKERS).await {
        Ok(()) => info!("Jackett reachable at {}", config.jackett.base_url()),
        Err(e) => warn!(
            error = %e,
            "Jackett not reachable at {}, will retry every query interval",
            config.jackett.base_url()
        ),
    }

    let tribler = TriblerClient::new(&config.tribler).context("Failed to create Tribler client")?;
    info!("Using Tribler channel at {}", config.tribler.base_url());

    let indexer: Arc<dyn Indexer> = Arc::new(jackett);
    let channel: Arc<dyn ChannelClient> = Arc::new(tribler);
    let syncer = FeedSyncer::new(indexer, channel, SyncSettings::from(&config));

    syncer.start().await;

    shutdown_signal().await;

    // A second interrupt skips the graceful stop
    tokio::select! {
        _ = syncer.stop() => {}
        _ = signal::ctrl_c() => {
            warn!("Second interrupt received, exiting immediately");
            std::process::exit(130);
        }
    }

    let status = syncer.status();
    info!(
        fetch_cycles = status.fetch_cycles,
        feed_errors = status.feed_errors,
        torrents_added = status.torrents_added,
        add_failures = status.add_failures,
        commits = status.commits,
        commit_failures = status.commit_failures,
        "Shutdown complete"
    );

    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
