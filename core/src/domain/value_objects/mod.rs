//! Value objects representing immutable domain concepts.

pub mod auth_context;

pub use auth_context::AuthContext;
