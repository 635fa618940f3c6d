//! FraudLens server entry point

use std::net::SocketAddr;

use anyhow::Context;
use fraudlens::{config::Config, create_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let default_filter = if config.is_production() {
        "fraudlens=info,tower_http=info"
    } else {
        "fraudlens=debug,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("FraudLens starting ({})...", config.environment);
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Model directory: {}", config.model_dir.display());

    let port = config.port;
    let state = AppState::initialize(config).await?;
    tracing::info!(
        "Fraud detector ready: {} features, threshold {}",
        state.detector.feature_count(),
        state.detector.threshold()
    );

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
