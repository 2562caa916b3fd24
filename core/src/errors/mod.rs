//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    /// Storage failed; never swallowed and never partially applied
    #[error("Persistence failure: {message}")]
    Persistence { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Wraps a storage error
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        DomainError::Persistence {
            message: err.to_string(),
        }
    }

    /// True for every failure that must reach the client as the uniform 401
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            DomainError::Unauthorized | DomainError::Auth(_) | DomainError::Token(_)
        )
    }

    /// True when a refresh token replay was detected
    pub fn is_reuse_detected(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::TokenReuseDetected))
    }
}
