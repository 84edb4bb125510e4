//! Authentication service routes

use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    AppState, face,
    error::AuthError,
    middleware::require_admin,
    models::{NewUser, Role},
    validation,
};

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    /// Captured face samples, one descriptor per frame. Staff only.
    #[serde(default, rename = "faceDescriptors")]
    pub face_descriptors: Vec<Vec<f32>>,
}

/// Request for password login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request for staff face login
#[derive(Deserialize)]
pub struct FaceLoginRequest {
    pub email: String,
    #[serde(default)]
    pub descriptor: Vec<f32>,
}

/// Response carrying an issued bearer token
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub role: Role,
}

/// Response for the staff password phase: the password checked out, but no
/// token is issued until the face check passes.
#[derive(Serialize)]
pub struct PasswordCheckResponse {
    pub valid: bool,
    pub role: Role,
}

/// Response for face login
#[derive(Serialize)]
pub struct FaceLoginResponse {
    pub token: String,
    pub message: String,
}

/// Simple acknowledgment response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/auth/users", get(list_users))
        .route("/auth/users/:id", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/face-login", post(face_login))
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Register a new user.
///
/// Staff registration requires at least one face sample; the stored
/// enrollment is the element-wise mean of all samples.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    validation::validate_name(&payload.name).map_err(AuthError::InvalidInput)?;
    validation::validate_email(&payload.email).map_err(AuthError::InvalidInput)?;
    validation::validate_password(&payload.password).map_err(AuthError::InvalidInput)?;

    let role = Role::from_str(&payload.role).map_err(AuthError::InvalidInput)?;

    let face_descriptor = match role {
        Role::Staff => {
            if payload.face_descriptors.is_empty() {
                return Err(AuthError::InvalidInput(
                    "Face samples are required for staff registration".to_string(),
                ));
            }

            if payload.face_descriptors.len() != face::ENROLLMENT_SAMPLES {
                warn!(
                    "Enrolling {} with {} face samples, expected {}",
                    payload.email,
                    payload.face_descriptors.len(),
                    face::ENROLLMENT_SAMPLES
                );
            }

            let mean = face::mean_embedding(&payload.face_descriptors)
                .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
            Some(face::encode_descriptor(&mean))
        }
        // A descriptor supplied for an admin is ignored.
        Role::Admin => None,
    };

    let existing = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::Internal
        })?;

    if existing.is_some() {
        return Err(AuthError::Conflict("User already exists".to_string()));
    }

    state
        .user_repository
        .create(&NewUser {
            name: payload.name,
            email: payload.email.clone(),
            password: payload.password,
            role,
            face_descriptor,
        })
        .await
        .map_err(map_create_error)?;

    info!("Registered {} user: {}", role, payload.email);

    Ok(Json(MessageResponse {
        message: "Registration successful".to_string(),
    }))
}

/// Map a user-creation failure. The uniqueness pre-check races with a
/// concurrent registration for the same email; when the loser hits the
/// unique constraint it is still a duplicate, not a server error.
fn map_create_error(e: anyhow::Error) -> AuthError {
    if let Some(db_err) = e
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
    {
        if db_err.is_unique_violation() {
            return AuthError::Conflict("User already exists".to_string());
        }
    }

    error!("Failed to create user: {}", e);
    AuthError::Internal
}

/// Password login.
///
/// Admins receive a bearer token directly. Staff only receive a
/// "password valid, proceed to face check" signal; the face step issues
/// the token. The flow is stateless between the two phases.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AuthError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    info!("Login attempt for {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::Internal
        })?
        .ok_or_else(|| AuthError::Unauthorized("User not found".to_string()))?;

    if user.password_hash.is_empty() {
        return Err(AuthError::Unauthorized(
            "No password set for this user".to_string(),
        ));
    }

    let valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .map_err(|e| {
            error!("Password verification failed: {}", e);
            AuthError::Internal
        })?;

    if !valid {
        return Err(AuthError::Unauthorized("Invalid password".to_string()));
    }

    match user.role {
        Role::Admin => {
            let token = state.jwt_service.issue_token(&user).map_err(|e| {
                error!("Failed to issue token: {}", e);
                AuthError::Internal
            })?;

            Ok(Json(TokenResponse {
                token,
                role: user.role,
            })
            .into_response())
        }
        Role::Staff => Ok(Json(PasswordCheckResponse {
            valid: true,
            role: user.role,
        })
        .into_response()),
    }
}

/// Face login for staff.
///
/// Independently re-verifies identity by email: no state is carried over
/// from the password phase.
pub async fn face_login(
    State(state): State<AppState>,
    Json(payload): Json<FaceLoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    if payload.email.is_empty() || payload.descriptor.is_empty() {
        return Err(AuthError::InvalidInput(
            "Email and face descriptor are required".to_string(),
        ));
    }

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::Internal
        })?
        .ok_or_else(|| AuthError::Unauthorized("User not found".to_string()))?;

    if user.role != Role::Staff {
        return Err(AuthError::Forbidden(
            "Only staff can log in with Face ID".to_string(),
        ));
    }

    let stored_bytes = user.face_descriptor.as_ref().ok_or_else(|| {
        AuthError::Unauthorized("No face data registered for this user".to_string())
    })?;

    let enrolled = face::decode_descriptor(stored_bytes).map_err(|e| {
        error!("Stored descriptor for {} is corrupt: {}", user.email, e);
        AuthError::Internal
    })?;

    let distance = face::euclidean_distance(&payload.descriptor, &enrolled)
        .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

    if distance > face::MATCH_THRESHOLD {
        info!(
            "Face login rejected for {} (distance {:.3})",
            user.email, distance
        );
        return Err(AuthError::Unauthorized("Face not recognized".to_string()));
    }

    let token = state.jwt_service.issue_token(&user).map_err(|e| {
        error!("Failed to issue token: {}", e);
        AuthError::Internal
    })?;

    info!("Face login successful for {}", user.email);

    Ok(Json(FaceLoginResponse {
        token,
        message: "Face login successful".to_string(),
    }))
}

/// List all staff identities. Admin only.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AuthError> {
    let staff = state.user_repository.list_staff().await.map_err(|e| {
        error!("Failed to list staff: {}", e);
        AuthError::Internal
    })?;

    Ok(Json(staff))
}

/// Delete a user by ID. Admin only; admin accounts can never be deleted.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::Internal
        })?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    if user.role == Role::Admin {
        return Err(AuthError::Forbidden(
            "Cannot delete an admin user".to_string(),
        ));
    }

    state.user_repository.delete(id).await.map_err(|e| {
        error!("Failed to delete user: {}", e);
        AuthError::Internal
    })?;

    info!("Deleted user {}", user.email);

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{JwtConfig, JwtService};
    use crate::repositories::UserRepository;
    use common::database::{DatabaseConfig, init_pool};

    async fn test_state() -> AppState {
        let pool = init_pool(&DatabaseConfig::from_env().unwrap())
            .await
            .unwrap();

        AppState {
            db_pool: pool.clone(),
            jwt_service: JwtService::new(&JwtConfig {
                secret: "test-secret".to_string(),
                token_expiry: 3600,
            }),
            user_repository: UserRepository::new(pool),
        }
    }

    fn new_user(role: Role, email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            role,
            face_descriptor: None,
        }
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_delete_admin_is_always_forbidden() {
        let state = test_state().await;
        let email = format!("admin-{}@example.com", Uuid::new_v4());
        let admin = state
            .user_repository
            .create(&new_user(Role::Admin, &email))
            .await
            .unwrap();

        let result = delete_user(State(state.clone()), Path(admin.id)).await;
        assert!(matches!(result, Err(AuthError::Forbidden(_))));

        // The account must be untouched.
        assert!(
            state
                .user_repository
                .find_by_id(admin.id)
                .await
                .unwrap()
                .is_some()
        );

        state.user_repository.delete(admin.id).await.unwrap();
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_delete_staff_succeeds() {
        let state = test_state().await;
        let email = format!("staff-{}@example.com", Uuid::new_v4());
        let staff = state
            .user_repository
            .create(&new_user(Role::Staff, &email))
            .await
            .unwrap();

        let result = delete_user(State(state.clone()), Path(staff.id)).await;
        assert!(result.is_ok());

        assert!(
            state
                .user_repository
                .find_by_id(staff.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_duplicate_email_maps_to_conflict() {
        let state = test_state().await;
        let email = format!("staff-{}@example.com", Uuid::new_v4());
        let first = state
            .user_repository
            .create(&new_user(Role::Staff, &email))
            .await
            .unwrap();

        // A second insert for the same email loses to the unique
        // constraint and must surface as a duplicate, not a 500.
        let err = state
            .user_repository
            .create(&new_user(Role::Staff, &email))
            .await
            .unwrap_err();
        assert!(matches!(map_create_error(err), AuthError::Conflict(_)));

        state.user_repository.delete(first.id).await.unwrap();
    }
}
