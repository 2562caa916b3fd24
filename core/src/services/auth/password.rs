//! Password verification behind a trait

use async_trait::async_trait;

use crate::errors::DomainError;

/// Checks a password against a stored hash
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    /// # Returns
    /// * `Ok(true)` - Password matches
    /// * `Ok(false)` - Password does not match
    /// * `Err(DomainError)` - The stored hash is unusable
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;

    /// Hash a password for storage
    async fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// A valid hash that matches no real password, verified against when the
    /// user does not exist so both paths cost the same
    fn dummy_hash(&self) -> &str;
}

/// bcrypt-backed verifier; hashing runs on the blocking pool
pub struct BcryptPasswordVerifier {
    cost: u32,
    dummy_hash: String,
}

impl BcryptPasswordVerifier {
    pub fn new() -> Result<Self, DomainError> {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }

    pub fn with_cost(cost: u32) -> Result<Self, DomainError> {
        let dummy_hash = bcrypt::hash("keystone-dummy-password", cost).map_err(|e| DomainError::Internal {
            message: format!("failed to prepare dummy password hash: {e}"),
        })?;
        Ok(Self { cost, dummy_hash })
    }
}

#[async_trait]
impl PasswordVerifier for BcryptPasswordVerifier {
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("password verification task failed: {e}"),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("stored password hash is unusable: {e}"),
            })
    }

    async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("password hashing task failed: {e}"),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("password hashing failed: {e}"),
            })
    }

    fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}
