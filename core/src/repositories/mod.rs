//! Repository interfaces consumed by the services, plus in-memory
//! implementations for tests.

pub mod token;
pub mod user;

pub use token::TokenRepository;
pub use user::UserRepository;

#[cfg(any(test, feature = "mock-services"))]
pub use token::MockTokenRepository;
#[cfg(any(test, feature = "mock-services"))]
pub use user::MockUserRepository;
