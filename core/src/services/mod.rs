//! Business services containing domain logic and use cases.

pub mod auth;
pub mod clock;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, BcryptPasswordVerifier, PasswordVerifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use token::{
    hash_token, AccessTokenCodec, CleanupResult, RefreshTokenStore, TokenCleanupConfig,
    TokenCleanupService, TokenIssuer, TokenRotation, TokenServiceConfig,
};
