//! # User Repository
//!
//! Operator accounts and authentication.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Login Flow                                      │
//! │                                                                         │
//! │  authenticate(username, password)                                      │
//! │       │                                                                 │
//! │       ├── No such user ───────────────► Ok(None)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  argon2 verify against stored PHC hash                                 │
//! │       │                                                                 │
//! │       ├── Mismatch ───────────────────► Ok(None)                       │
//! │       │                                                                 │
//! │       └── Match ──────────────────────► Ok(Some(User))                 │
//! │                                                                         │
//! │  Wrong username and wrong password are indistinguishable to the        │
//! │  caller. Err(_) is reserved for infrastructure failures.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::validation::{validate_password, validate_username};
use duka_core::{Role, User};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user with an argon2-hashed password.
    ///
    /// ## Errors
    /// - Validation errors for username/password format
    /// - [`DbError::UniqueViolation`] for a duplicate username
    pub async fn create(&self, username: &str, password: &str, role: Role) -> DbResult<User> {
        let username = username.trim();
        validate_username(username).map_err(duka_core::CoreError::from)?;
        validate_password(password).map_err(duka_core::CoreError::from)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DbError::PasswordHash(e.to_string()))?
            .to_string();

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        info!(id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    /// Verifies credentials. Returns None for unknown username or wrong
    /// password; Err is reserved for infrastructure failures.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let Some(user) = self.get_by_username(username.trim()).await? else {
            debug!(username = %username, "Login attempt for unknown user");
            return Ok(None);
        };

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| DbError::PasswordHash(e.to_string()))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
        {
            debug!(id = %user.id, "Login succeeded");
            Ok(Some(user))
        } else {
            debug!(id = %user.id, "Login failed: wrong password");
            Ok(None)
        }
    }

    /// Changes a user's password.
    pub async fn change_password(&self, user_id: &str, new_password: &str) -> DbResult<()> {
        validate_password(new_password).map_err(duka_core::CoreError::from)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new_password.as_bytes(), &salt)
            .map_err(|e| DbError::PasswordHash(e.to_string()))?
            .to_string();

        let updated = sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_id));
        }

        info!(id = %user_id, "Password changed");
        Ok(())
    }

    /// Gets a user by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists all users ordered by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, created_at FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// True when no users exist (fresh install, needs an admin).
    pub async fn is_empty(&self) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count == 0)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
