//! HS256 access token codec

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::entities::token::Claims;
use crate::domain::entities::user::User;
use crate::errors::{DomainError, TokenError};
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;

/// Signs and verifies access tokens
///
/// Expiry is checked against the injected clock instead of the system time,
/// so `verify` is a pure function of the secret and the clock.
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
    clock_skew_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl AccessTokenCodec {
    pub fn new(config: &TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        // exp/nbf are compared against the injected clock in `verify`
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.access_ttl(),
            clock_skew_seconds: config.clock_skew_seconds,
            clock,
        }
    }

    /// Access token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign an access token for `user`, valid from now for the configured TTL
    pub fn issue(&self, user: &User) -> Result<String, DomainError> {
        self.issue_at(user, self.clock.now())
    }

    /// Sign an access token as if issued at `issued_at`
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, DomainError> {
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            roles: user.roles.clone(),
            security_stamp: user.security_stamp.clone(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign access token");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    /// Verify signature, issuer, audience and expiry and return the claims
    ///
    /// # Returns
    /// * `Err(TokenError::InvalidSignature)` - Signed with another key
    /// * `Err(TokenError::Expired)` - `now >= exp + clock_skew`
    /// * `Err(TokenError::InvalidToken)` - Malformed, wrong issuer/audience or not yet valid
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim {
                    claim: claim.clone(),
                },
                _ => TokenError::InvalidToken,
            })?
            .claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp + self.clock_skew_seconds {
            return Err(TokenError::Expired.into());
        }
        if claims.nbf > now + self.clock_skew_seconds {
            return Err(TokenError::InvalidToken.into());
        }

        Ok(claims)
    }
}
