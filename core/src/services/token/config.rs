//! Configuration for the token services

use chrono::Duration;
use ks_shared::JwtConfig;

use crate::errors::ValidationError;

/// Minimum HMAC secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Configuration for the token codec, store and issuer
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret (HS256)
    pub jwt_secret: String,
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim
    pub audience: String,
    /// Access token expiry in minutes (1..=120)
    pub access_token_expiry_minutes: i64,
    /// Refresh token expiry in days (1..=365)
    pub refresh_token_expiry_days: i64,
    /// Tolerated clock difference for access token expiry, in seconds
    pub clock_skew_seconds: i64,
    /// Random bytes per refresh token before encoding
    pub refresh_token_bytes: usize,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            access_token_expiry_minutes: jwt.access_token_expiry_minutes,
            refresh_token_expiry_days: jwt.refresh_token_expiry_days,
            clock_skew_seconds: jwt.clock_skew_seconds,
            refresh_token_bytes: 64,
        }
    }
}

impl TokenServiceConfig {
    /// Access token lifetime
    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expiry_minutes)
    }

    /// Refresh token lifetime
    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_expiry_days)
    }

    /// Reject out-of-range lifetimes and weak secrets
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(ValidationError::TooShort {
                field: "jwt_secret".to_string(),
                min: MIN_SECRET_LENGTH,
            });
        }
        check_range("access_token_expiry_minutes", self.access_token_expiry_minutes, 1, 120)?;
        check_range("refresh_token_expiry_days", self.refresh_token_expiry_days, 1, 365)?;
        check_range("clock_skew_seconds", self.clock_skew_seconds, 0, 300)?;
        if self.refresh_token_bytes < 32 {
            return Err(ValidationError::TooShort {
                field: "refresh_token_bytes".to_string(),
                min: 32,
            });
        }
        Ok(())
    }
}

fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}
