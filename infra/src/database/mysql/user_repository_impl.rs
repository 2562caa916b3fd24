//! MySQL implementation of the UserRepository trait.
//!
//! Roles are stored as a comma separated list in `users.roles`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use ks_core::domain::entities::user::User;
use ks_core::errors::DomainError;
use ks_core::repositories::UserRepository;

const SELECT_COLUMNS: &str =
    "SELECT id, username, password_hash, roles, security_stamp, created_at FROM users";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(DomainError::persistence)?;
        let roles: String = row.try_get("roles").map_err(DomainError::persistence)?;

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?,
            username: row.try_get("username").map_err(DomainError::persistence)?,
            password_hash: row.try_get("password_hash").map_err(DomainError::persistence)?,
            roles: split_roles(&roles),
            security_stamp: row.try_get("security_stamp").map_err(DomainError::persistence)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(DomainError::persistence)?,
        })
    }
}

fn split_roles(roles: &str) -> Vec<String> {
    roles
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to find user by ID: {}", e)))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE username = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to find user by username: {}", e)))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (id, username, password_hash, roles, security_stamp, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.roles.join(","))
            .bind(&user.security_stamp)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Validation {
                    message: "Username is already taken".to_string(),
                },
                e => DomainError::persistence(format!("Failed to create user: {}", e)),
            })?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn update_security_stamp(&self, id: Uuid, security_stamp: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE users SET security_stamp = ? WHERE id = ?")
            .bind(security_stamp)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to update security stamp: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }
}
