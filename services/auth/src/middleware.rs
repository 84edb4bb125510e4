//! Middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{AppState, error::AuthError, models::Role};

/// Require a valid admin bearer token.
///
/// Extracts the `Authorization: Bearer` header, validates signature and
/// expiry, and rejects non-admin roles. The validated claims are inserted
/// into the request extensions for handlers that need the acting identity.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AuthError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::Unauthorized("Invalid authorization header".to_string()))?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        warn!("Token validation failed: {}", e);
        AuthError::Unauthorized("Invalid or expired token".to_string())
    })?;

    if claims.role != Role::Admin {
        return Err(AuthError::Forbidden(
            "Admin privileges required".to_string(),
        ));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
