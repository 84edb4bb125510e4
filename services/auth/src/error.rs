//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the authentication service
///
/// Every operation failure is turned into one of these at the handler
/// boundary; store failures are logged there and surfaced as `Internal`
/// so no backend detail reaches the client.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing or malformed input
    #[error("{0}")]
    InvalidInput(String),

    /// Bad credentials, failed face match, or missing enrollment
    #[error("{0}")]
    Unauthorized(String),

    /// Role mismatch or attempt to delete an admin
    #[error("{0}")]
    Forbidden(String),

    /// Unknown user
    #[error("{0}")]
    NotFound(String),

    /// Duplicate registration
    #[error("{0}")]
    Conflict(String),

    /// Store or backing-service failure
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
