//! Tag endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::tag::{CreateTag, Tag},
    AppState,
};

/// List all tags
#[utoipa::path(
    get,
    path = "/tags",
    tag = "tags",
    responses(
        (status = 200, description = "All tags", body = Vec<Tag>)
    )
)]
pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    Ok(Json(state.services.catalog.list_tags().await?))
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/tags",
    tag = "tags",
    request_body = CreateTag,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 409, description = "Tag already exists")
    )
)]
pub async fn create_tag(
    State(state): State<AppState>,
    Json(data): Json<CreateTag>,
) -> AppResult<(StatusCode, Json<Tag>)> {
    data.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tag = state.services.catalog.create_tag(&data.name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}
