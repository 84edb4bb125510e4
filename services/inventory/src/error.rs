//! Custom error types for the inventory service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the inventory service
///
/// Handlers convert every failure into one of these; store errors are
/// logged at the boundary and collapse into `Internal` so no sqlx detail
/// reaches the client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing/malformed fields, non-positive quantities, over-withdrawal
    #[error("{0}")]
    InvalidInput(String),

    /// Missing acting identity
    #[error("{0}")]
    Unauthorized(String),

    /// Mutation attempted by a non-creator
    #[error("{0}")]
    Forbidden(String),

    /// Unknown item
    #[error("{0}")]
    NotFound(String),

    /// Store failure
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for inventory results
pub type ApiResult<T> = Result<T, ApiError>;
