//! # Infrastructure Layer
//!
//! Concrete persistence for the Keystone core:
//! - **Database**: MySQL connection pool and embedded migrations (SQLx)
//! - **Repositories**: `TokenRepository` and `UserRepository` over MySQL

pub mod database;

pub use database::{DatabasePool, MySqlTokenRepository, MySqlUserRepository, PoolStatistics};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
