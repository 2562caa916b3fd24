//! Verified identity extracted from an access token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::token::Claims;
use crate::errors::TokenError;

/// Identity of the caller, passed explicitly to every operation that needs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: Uuid,

    /// Username carried in the token
    pub username: String,

    /// Role names carried in the token
    pub roles: Vec<String>,

    /// Identifier of the access token
    pub jti: String,
}

impl AuthContext {
    /// Checks whether the caller holds the given role
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl TryFrom<Claims> for AuthContext {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: claims.user_id()?,
            username: claims.name,
            roles: claims.roles,
            jti: claims.jti,
        })
    }
}
