//! FraudLens - Transaction Fraud Detection Demo Service
//!
//! Scores transactions with an isolation forest trained on synthetic data,
//! stores every scored transaction in SQLite and serves a live dashboard.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FRAUDLENS                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────┐  ┌──────────────────┐ │
//! │  │  Page     │  │  /predict        │  │  /dashboard      │ │
//! │  │  (form +  │─▶│  FraudDetector   │  │  DashboardSummary│ │
//! │  │  polling) │  │  (forest+scaler) │  │                  │ │
//! │  └───────────┘  └────────┬─────────┘  └────────┬─────────┘ │
//! │                          └───────────┬─────────┘           │
//! │                                      ▼                     │
//! │                               ┌─────────────┐              │
//! │                               │   SQLite    │              │
//! │                               └─────────────┘              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod model;
pub mod models;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::FraudDetector;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub detector: Arc<FraudDetector>,
    pub config: Config,
}

impl AppState {
    /// Provision the model, then open and migrate the store
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        let artifacts = model::get_model(&config.model_dir, &config.training())
            .context("Failed to provision model artifacts")?;
        let detector = FraudDetector::new(artifacts, config.fraud_threshold)
            .context("Model artifacts are unusable")?;

        let pool = db::create_pool(&config.database_url)
            .await
            .context("Failed to create database pool")?;
        db::run_migrations(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            pool,
            detector: Arc::new(detector),
            config,
        })
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::ui::index).post(handlers::ui::submit))
        .route("/predict", post(handlers::predict::predict))
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/health", get(handlers::health::check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
