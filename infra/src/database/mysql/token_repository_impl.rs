//! MySQL implementation of the TokenRepository trait.
//!
//! Rows are keyed by a CHAR(36) id and looked up by the unique SHA-256 hash.
//! State transitions are single conditional UPDATE statements whose
//! `rows_affected` decides whether the caller won.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use ks_core::domain::entities::token::RefreshToken;
use ks_core::errors::DomainError;
use ks_core::repositories::TokenRepository;

const SELECT_COLUMNS: &str =
    "SELECT id, token_hash, user_id, created_at, expires_at, used, invalidated FROM refresh_tokens";

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row.try_get("id").map_err(DomainError::persistence)?;
        let user_id: String = row.try_get("user_id").map_err(DomainError::persistence)?;

        Ok(RefreshToken {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid token UUID: {}", e),
            })?,
            user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?,
            token_hash: row.try_get("token_hash").map_err(DomainError::persistence)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(DomainError::persistence)?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(DomainError::persistence)?,
            used: row.try_get("used").map_err(DomainError::persistence)?,
            invalidated: row.try_get("invalidated").map_err(DomainError::persistence)?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, token_hash, user_id, created_at, expires_at, used, invalidated
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(&token.token_hash)
            .bind(token.user_id.to_string())
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.used)
            .bind(token.invalidated)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %token.user_id, "Failed to save refresh token");
                DomainError::persistence(format!("Failed to save refresh token: {}", e))
            })?;

        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to find refresh token: {}", e)))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to find refresh token by ID: {}", e)))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!("{} WHERE user_id = ? ORDER BY created_at", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to find user tokens: {}", e)))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET used = TRUE
            WHERE id = ? AND used = FALSE AND invalidated = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to mark refresh token used: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_invalidated(&self, id: Uuid) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET invalidated = TRUE
            WHERE id = ? AND invalidated = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to invalidate refresh token: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn invalidate_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET invalidated = TRUE
            WHERE user_id = ? AND invalidated = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to invalidate user tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let query = r#"
            DELETE FROM refresh_tokens
            WHERE expires_at < ?
               OR ((used = TRUE OR invalidated = TRUE) AND created_at < ?)
        "#;

        let result = sqlx::query(query)
            .bind(cutoff)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to delete expired tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}
