//! User repository trait defining the interface the auth layer consumes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User lookups and security stamp rotation
///
/// Role storage is outside the auth layer; implementations only have to hand
/// back the role names of a user.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their ID
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with this id
    /// * `Err(DomainError)` - Database error occurred
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by their login name
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError)` - Username taken or database error
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Replace the security stamp of a user
    ///
    /// # Returns
    /// * `Ok(true)` - Stamp replaced
    /// * `Ok(false)` - User not found
    async fn update_security_stamp(&self, id: Uuid, security_stamp: &str) -> Result<bool, DomainError>;
}
