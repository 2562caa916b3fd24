//! Refresh token store: random opaque tokens persisted as SHA-256 digests

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;
use crate::repositories::TokenRepository;
use crate::services::clock::Clock;

/// Hex-encoded SHA-256 of a plaintext refresh token
///
/// A fast hash is sufficient: the tokens carry at least 256 bits of entropy.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Creates and looks up refresh tokens without ever persisting the plaintext
pub struct RefreshTokenStore<R: TokenRepository> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    token_bytes: usize,
}

impl<R: TokenRepository> RefreshTokenStore<R> {
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, token_bytes: usize) -> Self {
        Self {
            repository,
            clock,
            token_bytes,
        }
    }

    /// Create and persist a refresh token for `user_id`
    ///
    /// The plaintext is only returned after its hash has been saved.
    ///
    /// # Returns
    /// * `Ok((plaintext, row_id))`
    /// * `Err(DomainError)` - Persistence failed; no token exists
    pub async fn create(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(String, Uuid), DomainError> {
        let plaintext = self.generate_token();
        let row = RefreshToken::new(user_id, hash_token(&plaintext), self.clock.now(), expires_at);

        let saved = self.repository.save_refresh_token(row).await?;
        tracing::debug!(user_id = %user_id, token_id = %saved.id, "Refresh token stored");

        Ok((plaintext, saved.id))
    }

    /// Look up a row by hash
    pub async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        self.repository.find_refresh_token(token_hash).await
    }

    /// Hash a presented plaintext and look it up
    pub async fn find_by_plaintext(&self, token: &str) -> Result<Option<RefreshToken>, DomainError> {
        self.find_by_hash(&hash_token(token)).await
    }

    /// Conditionally consume a row; `false` means another caller got there first
    pub async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        self.repository.mark_used(id).await
    }

    /// Invalidate a row. Idempotent.
    pub async fn mark_invalidated(&self, id: Uuid) -> Result<bool, DomainError> {
        self.repository.mark_invalidated(id).await
    }

    /// Invalidate every outstanding row of a user
    pub async fn invalidate_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.repository.invalidate_all_user_tokens(user_id).await
    }

    /// Delete rows past the retention cutoff
    pub async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        self.repository.delete_expired_tokens(cutoff).await
    }

    fn generate_token(&self) -> String {
        let mut bytes = vec![0u8; self.token_bytes];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
