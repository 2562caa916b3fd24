//! Authentication service module
//!
//! Composes the user repository, password verification and the token
//! services into the register / login / refresh / logout / authenticate use cases.

mod password;
mod service;


pub use password::{BcryptPasswordVerifier, PasswordVerifier};
pub use service::AuthService;
