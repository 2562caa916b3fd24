//! Main authentication service implementation

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;
use crate::domain::value_objects::AuthContext;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::clock::Clock;
use crate::services::token::{
    hash_token, AccessTokenCodec, RefreshTokenStore, TokenIssuer, TokenRotation, TokenServiceConfig,
};

use super::password::PasswordVerifier;

/// Authentication service
///
/// No operation relies on an ambient current user: every call receives the
/// credential or identity it acts on.
pub struct AuthService<U, R, P>
where
    U: UserRepository,
    R: TokenRepository,
    P: PasswordVerifier,
{
    users: Arc<U>,
    passwords: P,
    codec: Arc<AccessTokenCodec>,
    store: Arc<RefreshTokenStore<R>>,
    issuer: Arc<TokenIssuer<R>>,
    rotation: TokenRotation<R, U>,
    clock: Arc<dyn Clock>,
}

impl<U, R, P> AuthService<U, R, P>
where
    U: UserRepository,
    R: TokenRepository,
    P: PasswordVerifier,
{
    /// Wire up the token services from `config`
    ///
    /// # Returns
    /// * `Err(DomainError::ValidationErr)` - The configuration is out of range
    pub fn new(
        users: Arc<U>,
        tokens: Arc<R>,
        passwords: P,
        config: TokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let codec = Arc::new(AccessTokenCodec::new(&config, clock.clone()));
        let store = Arc::new(RefreshTokenStore::new(tokens, clock.clone(), config.refresh_token_bytes));
        let issuer = Arc::new(TokenIssuer::new(
            codec.clone(),
            store.clone(),
            clock.clone(),
            config.refresh_ttl(),
        ));
        let rotation = TokenRotation::new(store.clone(), issuer.clone(), users.clone(), clock.clone());

        Ok(Self {
            users,
            passwords,
            codec,
            store,
            issuer,
            rotation,
            clock,
        })
    }

    /// Refresh token store, shared with the retention sweep
    pub fn token_store(&self) -> Arc<RefreshTokenStore<R>> {
        self.store.clone()
    }

    /// Create a user with the `User` role and a fresh security stamp
    ///
    /// Password strength rules belong to the caller; this only refuses blank
    /// input.
    ///
    /// # Returns
    /// * `Ok(Uuid)` - Id of the new user
    /// * `Err(DomainError::Validation)` - Blank input or the username is taken
    pub async fn register(&self, username: &str, password: &str) -> Result<Uuid, DomainError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation {
                message: "Username and password are required".to_string(),
            });
        }

        if self.users.find_by_username(username).await?.is_some() {
            tracing::info!("Registration rejected: username taken");
            return Err(DomainError::Validation {
                message: "Username is already taken".to_string(),
            });
        }

        let password_hash = self.passwords.hash(password).await?;
        let user = self
            .users
            .create(User::new(username, password_hash, self.clock.now()))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.id)
    }

    /// Check credentials and issue a pair
    ///
    /// Unknown users and wrong passwords produce the same error after the
    /// same amount of hashing work.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, DomainError> {
        let user = self.users.find_by_username(username).await?;

        let user = match user {
            Some(user) => {
                if !self.passwords.verify(password, &user.password_hash).await? {
                    tracing::info!(user_id = %user.id, "Login rejected: wrong password");
                    return Err(AuthError::InvalidCredentials.into());
                }
                user
            }
            None => {
                // Result ignored, only the timing matters
                let _ = self.passwords.verify(password, self.passwords.dummy_hash()).await;
                tracing::info!("Login rejected: unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let pair = self.issuer.issue_pair(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(pair)
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        self.rotation.rotate(refresh_token).await
    }

    /// Invalidate the presented refresh token, if any
    ///
    /// Unknown or already invalidated tokens are not an error.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), DomainError> {
        let Some(refresh_token) = refresh_token else {
            tracing::debug!("Logout without refresh token");
            return Ok(());
        };

        match self.store.find_by_hash(&hash_token(refresh_token)).await? {
            Some(row) => {
                let flipped = self.store.mark_invalidated(row.id).await?;
                tracing::info!(user_id = %row.user_id, token_id = %row.id, flipped, "User logged out");
            }
            None => tracing::debug!("Logout with unknown refresh token"),
        }

        Ok(())
    }

    /// Verify an access token and check it against the user's current stamp
    ///
    /// # Returns
    /// * `Ok(AuthContext)` - The caller's identity
    /// * `Err(TokenError::StaleSecurityStamp)` - Sessions were revoked after issue
    /// * `Err(AuthError::UserNotFound)` - The subject no longer exists
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthContext, DomainError> {
        let claims = self.codec.verify(access_token)?;
        let user_id = claims.user_id()?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.security_stamp != claims.security_stamp {
            tracing::debug!(user_id = %user_id, "Access token carries a stale security stamp");
            return Err(TokenError::StaleSecurityStamp.into());
        }

        Ok(AuthContext::try_from(claims)?)
    }

    /// Revoke every session of a user
    ///
    /// Rotates the security stamp, which rejects outstanding access tokens,
    /// and invalidates every refresh token of the user.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of refresh tokens invalidated
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let stamp = User::new_security_stamp();

        if !self.users.update_security_stamp(user_id, &stamp).await? {
            return Err(DomainError::NotFound {
                resource: format!("user {user_id}"),
            });
        }

        let count = self.store.invalidate_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, invalidated = count, "All sessions revoked");

        Ok(count)
    }
}
