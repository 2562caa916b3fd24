use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use ks_core::domain::entities::token::TokenPair;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,

    #[validate(length(min = 6, max = 255), custom = "validate_password_strength")]
    pub password: String,
}

/// Requires a lowercase letter, an uppercase letter and a digit
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,

    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

/// Body of refresh and logout; the token may come from the cookie instead
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// `?use_cookies=true` switches token delivery from the JSON body to cookies
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub use_cookies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub access_token_expires_in: i64,
    /// Seconds until the refresh token expires
    pub refresh_token_expires_in: i64,
}

impl From<TokenPair> for AuthenticationResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_token_expires_in: pair.access_token_expires_in,
            refresh_token_expires_in: pair.refresh_token_expires_in,
        }
    }
}
