//! Live Monitor - Entry Point
//!
//! Independent process that polls the transaction store and renders rolling
//! KPIs plus a live feed. Runs until interrupted; a store outage only delays
//! the next cycle.

use aegis_scoring::{
    config::AppConfig,
    monitor::{ConsoleSink, LiveMonitor},
    TransactionStore,
};
use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aegis_scoring=info".parse()?)
                .add_directive("monitor=info".parse()?),
        )
        .init();

    info!("Starting Aegis Live Monitor");

    let config = AppConfig::load()?;

    let store = TransactionStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to open transaction store")?;

    let monitor = LiveMonitor::new(
        store,
        config.monitor.window,
        config.monitor.interval(),
        config.monitor.retry_interval(),
    );

    // Flip the shutdown signal on ctrl-c so the loop stops cleanly.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = stop_tx.send(true);
        }
    });

    let mut sink = ConsoleSink::new();
    monitor.run(&mut sink, stop_rx).await;

    Ok(())
}
