//! Domain entities representing core business objects.

pub mod token;
pub mod user;


// Re-export commonly used types
pub use token::{Claims, RefreshToken, RefreshTokenState, TokenPair};
pub use user::{roles, User};
