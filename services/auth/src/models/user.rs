//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Role;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Enrolled mean face descriptor, little-endian f32 bytes. Staff only.
    pub face_descriptor: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload
///
/// `password` is the plaintext credential; the repository hashes it before
/// anything is persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub face_descriptor: Option<Vec<u8>>,
}

/// Staff identity as exposed to admins. Never carries the credential hash
/// or the enrolled descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct StaffSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
