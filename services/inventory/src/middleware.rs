//! Acting-identity extraction
//!
//! Write operations carry the acting identity as a plain `x-user-email`
//! header. This is a deliberate collaborator simplification: the handlers
//! only require "an authenticated principal identifier", and the header
//! stands in for a verified token claim.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the acting identity's email
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The authenticated principal performing a write operation
#[derive(Debug, Clone)]
pub struct ActingUser {
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Acting identity required".to_string()))?;

        Ok(ActingUser {
            email: email.to_string(),
        })
    }
}
