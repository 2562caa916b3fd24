//! Authentication route handlers
//!
//! This module contains the session lifecycle endpoints:
//! - Registration of a new user
//! - Login with username and password
//! - Refresh token rotation
//! - Logout
//! - Revoking every session of the caller
//! - Identity of the caller

pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;
pub mod revoke;

use std::sync::Arc;

use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::{AuthService, PasswordVerifier};

/// Application state that holds shared services
pub struct AppState<U, R, P>
where
    U: UserRepository,
    R: TokenRepository,
    P: PasswordVerifier,
{
    pub auth_service: Arc<AuthService<U, R, P>>,
}

impl<U, R, P> AppState<U, R, P>
where
    U: UserRepository,
    R: TokenRepository,
    P: PasswordVerifier,
{
    pub fn new(auth_service: Arc<AuthService<U, R, P>>) -> Self {
        Self { auth_service }
    }
}
