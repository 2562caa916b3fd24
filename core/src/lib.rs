//! # Keystone Core
//!
//! Core domain layer for the Keystone backend: access token codec, hashed
//! refresh token store, token issuer, rotation with reuse detection, the
//! retention sweep and the authentication service composing them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
