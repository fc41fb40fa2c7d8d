//! User endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrow::BorrowDetails,
    models::user::{CreateStaff, Role, User, UserProfile, UserQuery},
    AppState,
};

use super::PaginatedResponse;

/// User representation without credential fields
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
        }
    }
}

/// List users with search and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<UserResponse>)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<UserResponse>>> {
    let (users, total) = state.services.users.list(&query).await?;
    let results = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        results,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get user profile with circulation counts
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.services.users.profile(id).await?))
}

/// Borrow history of one user
#[utoipa::path(
    get,
    path = "/users/{id}/borrows",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Borrow history", body = Vec<BorrowDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_borrow_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    Ok(Json(state.services.ledger.user_history(id).await?))
}

/// Provision a staff account
#[utoipa::path(
    post,
    path = "/users/staff",
    tag = "users",
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff account created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_staff(
    State(state): State<AppState>,
    Json(data): Json<CreateStaff>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.services.users.create_staff(&data).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}
