//! Token module for the access/refresh token lifecycle
//!
//! This module handles:
//! - JWT access token signing and verification (`codec`)
//! - Hashed refresh token persistence (`store`)
//! - Minting access/refresh pairs (`issuer`)
//! - Refresh token rotation with reuse detection (`rotation`)
//! - Background retention sweep of stale rows (`cleanup`)

mod cleanup;
mod codec;
mod config;
mod issuer;
mod rotation;
mod store;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use codec::AccessTokenCodec;
pub use config::TokenServiceConfig;
pub use issuer::TokenIssuer;
pub use rotation::TokenRotation;
pub use store::{hash_token, RefreshTokenStore};
