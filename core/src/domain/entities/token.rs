//! Token entities for JWT access tokens and hashed refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenError;

/// Claims structure for the access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Username at the time of issue
    pub name: String,

    /// Role names
    #[serde(default)]
    pub roles: Vec<String>,

    /// Security stamp of the user at the time of issue
    pub security_stamp: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Parses the subject back into a user id
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::InvalidToken)
    }
}

/// Lifecycle state of a stored refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Used,
    Invalidated,
}

/// Persisted refresh token row. Only the hash of the token is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the row
    pub id: Uuid,

    /// SHA-256 hex digest of the plaintext token
    pub token_hash: String,

    /// Owner of the token
    pub user_id: Uuid,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp after which the token no longer validates
    pub expires_at: DateTime<Utc>,

    /// Set once the token has been exchanged by rotation
    pub used: bool,

    /// Set by logout, reuse detection or session revocation
    pub invalidated: bool,
}

impl RefreshToken {
    /// Creates a new active refresh token row
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            user_id,
            created_at,
            expires_at,
            used: false,
            invalidated: false,
        }
    }

    /// Derives the lifecycle state from the flags
    pub fn state(&self) -> RefreshTokenState {
        if self.invalidated {
            RefreshTokenState::Invalidated
        } else if self.used {
            RefreshTokenState::Used
        } else {
            RefreshTokenState::Active
        }
    }

    /// Expiry is strict: a token is still valid at exactly `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Freshly minted access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    /// Signed JWT access token
    pub access_token: String,

    /// Plaintext refresh token (only ever handed to the client)
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_token_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expires_in: i64,

    /// Absolute access token expiry
    pub access_token_expires_at: DateTime<Utc>,

    /// Absolute refresh token expiry
    pub refresh_token_expires_at: DateTime<Utc>,
}
