//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::Transaction;
use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_features: usize,
    fraud_threshold: f64,
    transactions: i64,
}

pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let transactions = Transaction::count(&state.pool).await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_features: state.detector.feature_count(),
        fraud_threshold: state.detector.threshold(),
        transactions,
    }))
}
