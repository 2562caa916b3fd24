//! Tests for the in-memory user repository

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;
use crate::repositories::user::{MockUserRepository, UserRepository};

#[tokio::test]
async fn test_find_by_username_and_id() {
    let user = User::new("alice", "hash", Utc::now());
    let repo = MockUserRepository::with_users([user.clone()]);

    assert_eq!(repo.find_by_username("alice").await.unwrap(), Some(user.clone()));
    assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user));
    assert!(repo.find_by_username("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_rejects_duplicate_username() {
    let repo = MockUserRepository::new();
    repo.create(User::new("alice", "hash", Utc::now())).await.unwrap();

    let result = repo.create(User::new("alice", "other", Utc::now())).await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_update_security_stamp() {
    let user = User::new("alice", "hash", Utc::now());
    let repo = MockUserRepository::with_users([user.clone()]);

    assert!(repo.update_security_stamp(user.id, "new-stamp").await.unwrap());
    assert!(!repo.update_security_stamp(Uuid::new_v4(), "x").await.unwrap());

    let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.security_stamp, "new-stamp");
}
