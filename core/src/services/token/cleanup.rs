//! Token cleanup service for periodic deletion of stale refresh token rows
//!
//! Rows are only deleted once they are terminal or expired and older than a
//! grace period, so a row is never removed while it could still validate.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ks_shared::CleanupConfig;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;
use crate::services::clock::Clock;

use super::store::RefreshTokenStore;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Grace period after expiry or consumption before deletion
    pub grace_period: Duration,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self::from(&CleanupConfig::default())
    }
}

impl From<&CleanupConfig> for TokenCleanupConfig {
    fn from(config: &CleanupConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds,
            grace_period: Duration::seconds(config.grace_period_seconds),
            enabled: config.enabled,
        }
    }
}

/// Service for deleting refresh tokens past the retention cutoff
pub struct TokenCleanupService<R: TokenRepository + 'static> {
    store: Arc<RefreshTokenStore<R>>,
    clock: Arc<dyn Clock>,
    config: TokenCleanupConfig,
}

impl<R: TokenRepository + 'static> TokenCleanupService<R> {
    /// Create a new token cleanup service
    pub fn new(store: Arc<RefreshTokenStore<R>>, clock: Arc<dyn Clock>, config: TokenCleanupConfig) -> Self {
        Self { store, clock, config }
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the sweep
    /// * `Err(DomainError)` - The delete failed
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let cutoff = self.clock.now() - self.config.grace_period;
        info!(cutoff = %cutoff, "Starting token cleanup cycle");

        let deleted = self.store.delete_expired(cutoff).await?;
        info!(deleted, "Token cleanup completed");

        Ok(CleanupResult {
            tokens_deleted: deleted,
            cutoff: Some(cutoff),
        })
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals. The
    /// first cycle runs immediately.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Token cleanup service started"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Token cleanup cycle failed");
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    /// Number of refresh token rows deleted
    pub tokens_deleted: usize,
    /// Cutoff used for this cycle; `None` when cleanup is disabled
    pub cutoff: Option<DateTime<Utc>>,
}
