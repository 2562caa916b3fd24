//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken persistence operations
///
/// Rows are only ever looked up by the SHA-256 hash of the plaintext token.
/// After creation the only permitted mutations are flipping `used` and
/// `invalidated` to true, and deleting rows past the retention cutoff.
///
/// # Concurrency
/// `mark_used` and `mark_invalidated` are conditional updates. Implementations
/// must apply them atomically against the stored row and report whether this
/// call performed the transition, so that at most one caller ever observes a
/// successful `mark_used` for a given row.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The persisted row
    /// * `Err(DomainError)` - Save failed (including a duplicate hash)
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use uuid::Uuid;
    /// # use ks_core::repositories::TokenRepository;
    /// # use ks_core::domain::entities::token::RefreshToken;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let now = Utc::now();
    /// let token = RefreshToken::new(Uuid::new_v4(), "sha256-hex".to_string(), now, now + Duration::days(7));
    ///
    /// let saved = repo.save_refresh_token(token).await?;
    /// println!("Token saved with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    ///
    /// Returns the row regardless of its flags or expiry; validation is the
    /// caller's job.
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Find a refresh token by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError>;

    /// Find all rows (in any state) belonging to a user
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Conditionally mark a token used
    ///
    /// Equivalent to `UPDATE ... SET used = TRUE WHERE id = ? AND used = FALSE
    /// AND invalidated = FALSE`.
    ///
    /// # Returns
    /// * `Ok(true)` - This call consumed the row
    /// * `Ok(false)` - The row was missing or already consumed (lost race)
    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Mark a token invalidated. Idempotent.
    ///
    /// # Returns
    /// * `Ok(true)` - The row was flipped by this call
    /// * `Ok(false)` - The row was missing or already invalidated
    async fn mark_invalidated(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Invalidate every outstanding (not yet invalidated) token of a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows flipped
    async fn invalidate_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Delete rows that are past the retention cutoff
    ///
    /// Removes rows with `expires_at < cutoff`, and rows that are used or
    /// invalidated and were created before `cutoff`.
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use ks_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let deleted = repo.delete_expired_tokens(Utc::now() - Duration::hours(1)).await?;
    /// println!("Cleaned up {} refresh tokens", deleted);
    /// # Ok(())
    /// # }
    /// ```
    async fn delete_expired_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
