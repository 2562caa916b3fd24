//! Domain-specific error types for authentication and token operations
//!
//! The variants are distinguished internally for logging; the presentation
//! layer collapses every authentication failure into one client response.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user or wrong password; deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The user referenced by a token no longer exists
    #[error("User not found")]
    UserNotFound,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid signature")]
    InvalidSignature,

    /// A used or invalidated refresh token was presented again
    #[error("Refresh token reuse detected")]
    TokenReuseDetected,

    /// The security stamp in the token no longer matches the user
    #[error("Security stamp is stale")]
    StaleSecurityStamp,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Out of range: {field} (min: {min}, max: {max})")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("Too short: {field} (min length: {min})")]
    TooShort { field: String, min: usize },
}
