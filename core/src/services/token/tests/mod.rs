//! Unit tests for the token services


use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::entities::user::{roles, User};
use crate::repositories::{MockTokenRepository, MockUserRepository, TokenRepository, UserRepository};
use crate::services::clock::ManualClock;
use crate::services::token::{
    AccessTokenCodec, RefreshTokenStore, TokenIssuer, TokenRotation, TokenServiceConfig,
};

pub(super) const TEST_SECRET: &str = "unit-test-secret-with-at-least-32-bytes";

pub(super) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..TokenServiceConfig::default()
    }
}

pub(super) fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub(super) fn test_user() -> User {
    User::new("alice", "unused-hash", start_time()).with_roles([roles::USER, roles::ADMIN])
}

/// Fully wired token services over in-memory repositories
pub(super) struct Fixture<R: TokenRepository = MockTokenRepository, U: UserRepository = MockUserRepository> {
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<R>,
    pub users: Arc<U>,
    pub codec: Arc<AccessTokenCodec>,
    pub store: Arc<RefreshTokenStore<R>>,
    pub issuer: Arc<TokenIssuer<R>>,
    pub rotation: Arc<TokenRotation<R, U>>,
    pub user: User,
}

impl Fixture {
    pub fn new() -> Self {
        let user = test_user();
        Fixture::with_repositories(
            Arc::new(MockTokenRepository::new()),
            Arc::new(MockUserRepository::with_users([user.clone()])),
            user,
        )
    }
}

impl<R: TokenRepository, U: UserRepository> Fixture<R, U> {
    pub fn with_repositories(tokens: Arc<R>, users: Arc<U>, user: User) -> Self {
        let config = test_config();
        let clock = Arc::new(ManualClock::new(start_time()));

        let codec = Arc::new(AccessTokenCodec::new(&config, clock.clone()));
        let store = Arc::new(RefreshTokenStore::new(tokens.clone(), clock.clone(), config.refresh_token_bytes));
        let issuer = Arc::new(TokenIssuer::new(codec.clone(), store.clone(), clock.clone(), config.refresh_ttl()));
        let rotation = Arc::new(TokenRotation::new(store.clone(), issuer.clone(), users.clone(), clock.clone()));

        Self {
            clock,
            tokens,
            users,
            codec,
            store,
            issuer,
            rotation,
            user,
        }
    }
}
