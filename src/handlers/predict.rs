//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use validator::Validate;

use crate::models::{NewTransaction, PredictRequest, PredictResponse, Transaction};
use crate::{AppResult, AppState};

/// Score a transaction and record it
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(req) = payload?;
    let response = score_and_record(&state, req).await?;
    Ok(Json(response))
}

/// Shared by `/predict` and the page form
pub async fn score_and_record(state: &AppState, req: PredictRequest) -> AppResult<PredictResponse> {
    req.validate()?;

    let score = state.detector.score(&req.features())?;

    let stored = Transaction::record(
        &state.pool,
        NewTransaction {
            amount: req.amount,
            merchant: req.merchant.clone(),
            category: req.category,
            customer_id: req.customer_id_or_anon().to_string(),
            is_fraud: score.is_fraud,
            probability: score.probability,
        },
    )
    .await?;

    if score.is_fraud {
        tracing::info!(
            transaction_id = stored.id,
            merchant = %stored.merchant,
            amount = stored.amount,
            score = score.probability,
            "Fraud alert raised"
        );
    } else {
        tracing::debug!(
            transaction_id = stored.id,
            score = score.probability,
            "Transaction scored as normal"
        );
    }

    Ok(PredictResponse {
        is_fraud: score.is_fraud,
        probability: score.probability,
        alert: score.is_fraud,
    })
}
