//! stash-exporter - Prometheus exporter for Stash.

use clap::Parser;
use stash_exporter::{shutdown_signal, Cli, ExporterConfig, ExporterServer, ExporterState};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ExporterConfig::from(Cli::parse());

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = %config.mode,
        listen = %config.listen_addr,
        interval_secs = config.scrape_interval.as_secs(),
        timeout_secs = config.timeout.as_secs(),
        "Starting stash-exporter"
    );

    let state = ExporterState::connect(config)?;
    let client = state.collector().source();
    debug!(url = %client.url(), api_key = client.has_api_key(), "Stash client ready");

    let server = ExporterServer::new(state);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    server.run(cancel).await?;
    Ok(())
}
