//! Shared configuration and response types for the Keystone server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (auth, database, server, environment)
//! - The error response shape returned by every API endpoint

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CleanupConfig, DatabaseConfig, Environment, JwtConfig, LoggingConfig,
    ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
