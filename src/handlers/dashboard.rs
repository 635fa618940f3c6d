//! Dashboard handler

use axum::{extract::State, Json};

use crate::models::{DashboardResponse, DashboardSummary, Transaction};
use crate::{AppResult, AppState};

/// Aggregate every stored transaction; `{}` when the store is empty
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    let rows = Transaction::list_all(&state.pool).await?;
    let summary = DashboardSummary::build(&rows, state.config.recent_limit);
    Ok(Json(summary.into()))
}
