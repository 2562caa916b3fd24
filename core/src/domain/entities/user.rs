//! User entity as consumed by the authentication layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed role names carried in access tokens
pub mod roles {
    pub const USER: &str = "User";
    pub const ADMIN: &str = "Admin";
}

/// User identity with credentials and the current security stamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login name
    pub username: String,

    /// Password hash, never serialized into responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role names granted to the user
    pub roles: Vec<String>,

    /// Random value embedded in access tokens; rotating it revokes them
    #[serde(skip_serializing)]
    pub security_stamp: String,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user holding the `User` role
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            roles: vec![roles::USER.to_string()],
            security_stamp: Self::new_security_stamp(),
            created_at,
        }
    }

    /// Replaces the granted roles
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Checks whether the user holds the given role
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Generates a fresh security stamp value
    pub fn new_security_stamp() -> String {
        Uuid::new_v4().to_string()
    }
}
