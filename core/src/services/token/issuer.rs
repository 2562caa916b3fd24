//! Token issuer: codec + store -> token pair

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;
use crate::errors::DomainError;
use crate::repositories::TokenRepository;
use crate::services::clock::Clock;

use super::codec::AccessTokenCodec;
use super::store::RefreshTokenStore;

/// Mints access/refresh pairs for a user
pub struct TokenIssuer<R: TokenRepository> {
    codec: Arc<AccessTokenCodec>,
    store: Arc<RefreshTokenStore<R>>,
    clock: Arc<dyn Clock>,
    refresh_ttl: Duration,
}

impl<R: TokenRepository> TokenIssuer<R> {
    pub fn new(
        codec: Arc<AccessTokenCodec>,
        store: Arc<RefreshTokenStore<R>>,
        clock: Arc<dyn Clock>,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            store,
            clock,
            refresh_ttl,
        }
    }

    /// Issue a new pair for `user`
    ///
    /// If the refresh token cannot be persisted the whole operation fails and
    /// the already signed access token is dropped.
    pub async fn issue_pair(&self, user: &User) -> Result<TokenPair, DomainError> {
        let (pair, _) = self.issue_pair_with_id(user).await?;
        Ok(pair)
    }

    /// Same as [`issue_pair`](Self::issue_pair), also returning the id of the
    /// persisted refresh token row
    pub(crate) async fn issue_pair_with_id(&self, user: &User) -> Result<(TokenPair, Uuid), DomainError> {
        let now = self.clock.now();
        let access_expires_at = now + self.codec.ttl();
        let refresh_expires_at = now + self.refresh_ttl;

        let access_token = self.codec.issue_at(user, now)?;
        let (refresh_token, token_id) = self.store.create(user.id, refresh_expires_at).await?;

        tracing::debug!(user_id = %user.id, token_id = %token_id, "Issued token pair");

        let pair = TokenPair {
            access_token,
            refresh_token,
            access_token_expires_in: self.codec.ttl().num_seconds(),
            refresh_token_expires_in: self.refresh_ttl.num_seconds(),
            access_token_expires_at: access_expires_at,
            refresh_token_expires_at: refresh_expires_at,
        };

        Ok((pair, token_id))
    }
}
