//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, Role, StaffSummary, User};

/// Hash a plaintext password into an argon2 PHC string
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user, hashing the password before it is persisted
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.email);

        let password_hash = hash_password(&new_user.password)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, face_descriptor)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, face_descriptor, created_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(new_user.role.as_str())
        .bind(&new_user.face_descriptor)
        .fetch_one(&self.pool)
        .await?;

        Self::map_user(&row)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, face_descriptor, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, face_descriptor, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_user).transpose()
    }

    /// Verify a user's password against the stored argon2 hash
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }

    /// List all staff identities. Hashes and descriptors stay out of the
    /// projection entirely.
    pub async fn list_staff(&self) -> Result<Vec<StaffSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email
            FROM users
            WHERE role = $1
            ORDER BY name
            "#,
        )
        .bind(Role::Staff.as_str())
        .fetch_all(&self.pool)
        .await?;

        let staff = rows
            .into_iter()
            .map(|row| StaffSummary {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
            })
            .collect();

        Ok(staff)
    }

    /// Delete a user by ID. Returns false when no such user exists.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn map_user(row: &sqlx::postgres::PgRow) -> Result<User> {
        let role: String = row.get("role");
        let role = Role::from_str(&role).map_err(|e| anyhow::anyhow!(e))?;

        Ok(User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role,
            face_descriptor: row.get("face_descriptor"),
            created_at: row.get("created_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face;
    use common::database::{DatabaseConfig, init_pool};

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("secret123").unwrap();
        assert_ne!(hash, "secret123");

        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            password_hash: hash,
            role: Role::Staff,
            face_descriptor: None,
            created_at: chrono::Utc::now(),
        };

        let repo_free_verify = |password: &str| {
            let parsed = PasswordHash::new(&user.password_hash).unwrap();
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        };

        assert!(repo_free_verify("secret123"));
        assert!(!repo_free_verify("wrong"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
    }

    /// Needs a live PostgreSQL with db/schema.sql applied.
    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    async fn test_create_and_find_staff_user() {
        let pool = init_pool(&DatabaseConfig::from_env().unwrap())
            .await
            .unwrap();
        let repo = UserRepository::new(pool);

        let email = format!("staff-{}@example.com", Uuid::new_v4());
        let descriptor =
            face::mean_embedding(&[vec![0.0_f32, 0.0], vec![2.0, 2.0]]).unwrap();

        let created = repo
            .create(&NewUser {
                name: "Staff Member".to_string(),
                email: email.clone(),
                password: "secret123".to_string(),
                role: Role::Staff,
                face_descriptor: Some(face::encode_descriptor(&descriptor)),
            })
            .await
            .unwrap();

        let found = repo.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, Role::Staff);

        // Stored embedding is the coordinate-wise mean of the samples.
        let stored = face::decode_descriptor(found.face_descriptor.as_ref().unwrap()).unwrap();
        assert_eq!(stored, vec![1.0, 1.0]);

        assert!(repo.verify_password(&found, "secret123").unwrap());
        assert!(!repo.verify_password(&found, "wrong").unwrap());

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_email(&email).await.unwrap().is_none());
    }
}
