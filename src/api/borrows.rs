//! Lending ledger endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowDetails, IssueBook},
    AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ActiveBorrowsQuery {
    /// Only borrows past their due date
    pub overdue: Option<bool>,
}

/// Issue a book to a borrower
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body = IssueBook,
    responses(
        (status = 201, description = "Copy issued", body = BorrowDetails),
        (status = 404, description = "Borrower or book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn issue_book(
    State(state): State<AppState>,
    Json(request): Json<IssueBook>,
) -> AppResult<(StatusCode, Json<BorrowDetails>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let borrow = state.services.ledger.issue(&request).await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Copy returned", body = BorrowDetails),
        (status = 404, description = "Borrow record not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowDetails>> {
    Ok(Json(state.services.ledger.return_copy(id).await?))
}

/// List active borrows, optionally only overdue ones
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    params(ActiveBorrowsQuery),
    responses(
        (status = 200, description = "Active borrows", body = Vec<BorrowDetails>)
    )
)]
pub async fn list_active(
    State(state): State<AppState>,
    Query(query): Query<ActiveBorrowsQuery>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let overdue_only = query.overdue.unwrap_or(false);
    Ok(Json(state.services.ledger.list_active(overdue_only).await?))
}
