//! Scoring Service - Main Entry Point
//!
//! Loads the pretrained anomaly model, opens the transaction store, and
//! serves the scoring API. A missing model artifact aborts startup.

use aegis_scoring::{
    api::{self, AppState},
    config::AppConfig,
    OnnxScorer, ScoringService, TransactionStore,
};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aegis_scoring=info".parse()?)
                .add_directive("scoring_service=info".parse()?),
        )
        .init();

    info!("Starting Aegis Scoring Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Load the anomaly model. Fatal on failure: the service must not begin
    // serving without it.
    let scorer = OnnxScorer::load_with_threads(&config.model.path, config.model.onnx_threads)
        .context("Failed to load anomaly model; refusing to start")?;
    info!(model_path = %config.model.path, "Anomaly model loaded");

    // Open the transaction store and apply the schema
    let store = TransactionStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to open transaction store")?;
    store.migrate().await.context("Failed to apply schema")?;
    info!(database = %config.database.url, "Transaction store ready");

    // Build the service and router
    let service = ScoringService::new(Arc::new(scorer), store);
    let state = AppState {
        service: Arc::new(service),
    };
    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server host:port configuration")?;
    info!("Scoring service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
