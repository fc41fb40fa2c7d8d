//! Directory sync endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    services::{scheduler::SyncStatus, sync::SyncStats},
    AppState,
};

/// Trigger a directory sync run now
#[utoipa::path(
    post,
    path = "/sync/run",
    tag = "sync",
    responses(
        (status = 200, description = "Sync completed", body = SyncStats),
        (status = 409, description = "A sync is already running"),
        (status = 502, description = "Directory unreachable")
    )
)]
pub async fn run_sync(State(state): State<AppState>) -> AppResult<Json<SyncStats>> {
    Ok(Json(state.services.scheduler.trigger().await?))
}

/// Scheduler status: last run report and next scheduled run
#[utoipa::path(
    get,
    path = "/sync/status",
    tag = "sync",
    responses(
        (status = 200, description = "Scheduler status", body = SyncStatus)
    )
)]
pub async fn sync_status(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.services.scheduler.status())
}
