//! In-memory implementation of TokenRepository for tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RefreshTokenState};
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// In-memory token repository keyed by row id
///
/// Conditional updates run under the write lock, which gives them the same
/// compare-and-swap semantics as the SQL implementation.
#[derive(Clone, Default)]
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, RefreshToken>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every mutating call fail with a persistence error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every stored row
    pub async fn all_tokens(&self) -> Vec<RefreshToken> {
        self.tokens.read().await.values().cloned().collect()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// True when no rows are stored
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("simulated storage failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;

        if tokens.values().any(|t| t.token_hash == token.token_hash) {
            return Err(DomainError::persistence("duplicate token hash"));
        }

        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut found: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|t| t.created_at);
        Ok(found)
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&id) {
            Some(token) if !token.used && !token.invalidated => {
                token.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_invalidated(&self, id: Uuid) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&id) {
            Some(token) if !token.invalidated => {
                token.invalidated = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn invalidate_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.invalidated {
                token.invalidated = true;
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        self.check_writable()?;
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();

        tokens.retain(|_, t| {
            let terminal = t.state() != RefreshTokenState::Active;
            !(t.expires_at < cutoff || (terminal && t.created_at < cutoff))
        });

        Ok(before - tokens.len())
    }
}
