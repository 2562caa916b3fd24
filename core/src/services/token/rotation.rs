//! Refresh token rotation with reuse detection

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::token::{RefreshTokenState, TokenPair};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::clock::Clock;

use super::issuer::TokenIssuer;
use super::store::RefreshTokenStore;

/// Exchanges a refresh token for a new pair, exactly once
///
/// Every decision is taken on a single read of the row; the only write that
/// decides the outcome is the conditional `mark_used`. The replacement row is
/// persisted before that write, so a failed save leaves the old token usable.
pub struct TokenRotation<R: TokenRepository, U: UserRepository> {
    store: Arc<RefreshTokenStore<R>>,
    issuer: Arc<TokenIssuer<R>>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R: TokenRepository, U: UserRepository> TokenRotation<R, U> {
    pub fn new(
        store: Arc<RefreshTokenStore<R>>,
        issuer: Arc<TokenIssuer<R>>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            issuer,
            users,
            clock,
        }
    }

    /// Rotate a presented refresh token
    ///
    /// # Returns
    /// * `Ok(TokenPair)` - A new pair was persisted and the old row is now used
    /// * `Err(TokenError::InvalidToken)` - Unknown token or owner gone
    /// * `Err(TokenError::Expired)` - Past `expires_at`; the row is untouched
    /// * `Err(TokenError::TokenReuseDetected)` - Consumed token presented, or
    ///   the conditional update was lost; every token of the owner is invalidated
    pub async fn rotate(&self, plaintext: &str) -> Result<TokenPair, DomainError> {
        let row = self
            .store
            .find_by_plaintext(plaintext)
            .await?
            .ok_or(TokenError::InvalidToken)?;

        if row.is_expired_at(self.clock.now()) {
            tracing::debug!(token_id = %row.id, user_id = %row.user_id, "Expired refresh token presented");
            return Err(TokenError::Expired.into());
        }

        match row.state() {
            RefreshTokenState::Active => {}
            RefreshTokenState::Used => {
                return Err(self.reuse_detected(row.id, row.user_id, "used token presented").await);
            }
            RefreshTokenState::Invalidated => {
                return Err(self.reuse_detected(row.id, row.user_id, "invalidated token presented").await);
            }
        }

        let user = match self.users.find_by_id(row.user_id).await? {
            Some(user) => user,
            None => {
                tracing::info!(token_id = %row.id, user_id = %row.user_id, "Refresh token owner no longer exists");
                return Err(TokenError::InvalidToken.into());
            }
        };

        let (pair, new_token_id) = self.issuer.issue_pair_with_id(&user).await?;

        match self.store.mark_used(row.id).await {
            Ok(true) => {}
            Ok(false) => {
                self.discard_replacement(new_token_id).await;
                return Err(self.reuse_detected(row.id, row.user_id, "lost conditional update").await);
            }
            Err(e) => {
                self.discard_replacement(new_token_id).await;
                return Err(e);
            }
        }

        tracing::info!(
            user_id = %user.id,
            old_token_id = %row.id,
            new_token_id = %new_token_id,
            "Refresh token rotated"
        );

        Ok(pair)
    }

    /// Invalidate a replacement row whose rotation did not complete
    async fn discard_replacement(&self, token_id: Uuid) {
        if let Err(e) = self.store.mark_invalidated(token_id).await {
            tracing::error!(token_id = %token_id, error = %e, "Failed to invalidate unused replacement token");
        }
    }

    /// Invalidate all tokens of `user_id` and build the reuse error
    ///
    /// A failing cascade surfaces as the persistence error instead.
    async fn reuse_detected(&self, token_id: Uuid, user_id: Uuid, reason: &'static str) -> DomainError {
        tracing::warn!(
            security_event = "refresh_token_reuse",
            token_id = %token_id,
            user_id = %user_id,
            reason,
            "Refresh token reuse detected, invalidating all sessions of user"
        );

        match self.store.invalidate_all_for_user(user_id).await {
            Ok(count) => {
                tracing::warn!(security_event = "refresh_token_reuse", user_id = %user_id, invalidated = count, "Sessions invalidated");
                TokenError::TokenReuseDetected.into()
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to invalidate sessions after reuse");
                e
            }
        }
    }
}
