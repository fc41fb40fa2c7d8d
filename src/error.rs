//! Error types for Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes carried in every error response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchUser = 3,
    NoSuchBook = 4,
    BookNotAvailable = 5,
    AlreadyReturned = 6,
    Duplicate = 7,
    BadValue = 8,
    DirectoryFailure = 9,
    SyncInProgress = 10,
    BookHasIssuedCopies = 11,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Sync already running: {0}")]
    SyncInProgress(String),

    #[error("Book has issued copies: {0}")]
    HasIssuedCopies(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Upstream directory error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook, msg.clone())
            }
            AppError::UserNotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchUser, msg.clone())
            }
            AppError::Unavailable(msg) => {
                (StatusCode::CONFLICT, ErrorCode::BookNotAvailable, msg.clone())
            }
            AppError::InvalidState(msg) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyReturned, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::SyncInProgress(msg) => {
                (StatusCode::CONFLICT, ErrorCode::SyncInProgress, msg.clone())
            }
            AppError::HasIssuedCopies(msg) => {
                (StatusCode::CONFLICT, ErrorCode::BookHasIssuedCopies, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::DirectoryFailure, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_parts(err: AppError) -> (StatusCode, u32) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body["code"].as_u64().unwrap() as u32)
    }

    #[tokio::test]
    async fn each_variant_maps_to_its_own_code() {
        let cases = [
            (
                AppError::NotFound("x".to_string()),
                StatusCode::NOT_FOUND,
                ErrorCode::NoSuchBook,
            ),
            (
                AppError::UserNotFound("x".to_string()),
                StatusCode::NOT_FOUND,
                ErrorCode::NoSuchUser,
            ),
            (
                AppError::Unavailable("x".to_string()),
                StatusCode::CONFLICT,
                ErrorCode::BookNotAvailable,
            ),
            (
                AppError::InvalidState("x".to_string()),
                StatusCode::CONFLICT,
                ErrorCode::AlreadyReturned,
            ),
            (
                AppError::Validation("x".to_string()),
                StatusCode::BAD_REQUEST,
                ErrorCode::BadValue,
            ),
            (
                AppError::Conflict("x".to_string()),
                StatusCode::CONFLICT,
                ErrorCode::Duplicate,
            ),
            (
                AppError::SyncInProgress("x".to_string()),
                StatusCode::CONFLICT,
                ErrorCode::SyncInProgress,
            ),
            (
                AppError::HasIssuedCopies("x".to_string()),
                StatusCode::CONFLICT,
                ErrorCode::BookHasIssuedCopies,
            ),
            (
                AppError::Upstream("x".to_string()),
                StatusCode::BAD_GATEWAY,
                ErrorCode::DirectoryFailure,
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(response_parts(err).await, (status, code as u32));
        }
    }
}
