//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::DashboardStats, AppState};

/// Staff dashboard counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    Ok(Json(state.services.stats.dashboard().await?))
}
