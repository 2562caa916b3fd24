//! Integration tests for the session lifecycle endpoints
//!
//! The real routing, middleware and services run against the in-memory
//! repositories and a manual clock.

use std::sync::Arc;

use actix_web::{
    cookie::{Cookie, SameSite},
    dev::ServiceResponse,
    http::{header, StatusCode},
    test, web,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};

use ks_api::app::{create_app, DEFAULT_JSON_LIMIT};
use ks_api::routes::auth::AppState;
use ks_api::session::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use ks_core::domain::entities::user::{roles, User};
use ks_core::repositories::{MockTokenRepository, MockUserRepository, TokenRepository};
use ks_core::services::{AuthService, BcryptPasswordVerifier, ManualClock, PasswordVerifier, TokenServiceConfig};

const PASSWORD: &str = "correct horse battery staple";

type TestState = AppState<MockUserRepository, MockTokenRepository, BcryptPasswordVerifier>;

struct TestContext {
    state: web::Data<TestState>,
    tokens: Arc<MockTokenRepository>,
    clock: Arc<ManualClock>,
    user: User,
}

async fn context() -> TestContext {
    let passwords = BcryptPasswordVerifier::with_cost(4).unwrap();
    let hash = passwords.hash(PASSWORD).await.unwrap();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let user = User::new("alice", hash, start).with_roles([roles::USER, roles::ADMIN]);

    let users = Arc::new(MockUserRepository::with_users([user.clone()]));
    let tokens = Arc::new(MockTokenRepository::new());
    let clock = Arc::new(ManualClock::new(start));
    let config = TokenServiceConfig {
        jwt_secret: "api-integration-test-secret-of-sufficient-length".to_string(),
        ..TokenServiceConfig::default()
    };

    let auth_service = AuthService::new(users, tokens.clone(), passwords, config, clock.clone()).unwrap();

    TestContext {
        state: web::Data::new(AppState::new(Arc::new(auth_service))),
        tokens,
        clock,
        user,
    }
}

fn login_body() -> Value {
    json!({ "username": "alice", "password": PASSWORD })
}

fn cookie_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

macro_rules! app {
    ($ctx:expr) => {
        test::init_service(create_app($ctx.state.clone(), DEFAULT_JSON_LIMIT)).await
    };
}

macro_rules! login {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(login_body())
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

#[actix_web::test]
async fn test_health_check() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_login_returns_token_pair_as_json() {
    let ctx = context().await;
    let app = app!(ctx);

    let body = login!(app);

    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["access_token_expires_in"], 600);
    assert_eq!(body["refresh_token_expires_in"], 7 * 24 * 3600);
    assert_eq!(ctx.tokens.len().await, 1);
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = context().await;
    let app = app!(ctx);

    let mut bodies = Vec::new();
    for credentials in [
        json!({ "username": "alice", "password": "wrong" }),
        json!({ "username": "mallory", "password": PASSWORD }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(credentials)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        bodies.push((body["error"].clone(), body["message"].clone()));
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0].0, "UNAUTHORIZED");
    assert!(ctx.tokens.is_empty().await);
}

#[actix_web::test]
async fn test_register_then_login() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "username": "bob", "password": "Secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_str().unwrap().to_string();
    assert_ne!(id, ctx.user.id.to_string());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "bob", "password": "Secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((
            header::AUTHORIZATION,
            format!("Bearer {}", body["access_token"].as_str().unwrap()),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["user_id"], id.as_str());
}

#[actix_web::test]
async fn test_register_rejects_taken_username_and_weak_password() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "username": "alice", "password": "Secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "username": "carol", "password": "alllowercase1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["details"]["password"].is_array());

    // alice still logs in with the original password
    login!(app);
}

#[actix_web::test]
async fn test_login_rejects_invalid_body() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["username"].is_array());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_login_with_cookies() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login?use_cookies=true")
        .set_json(login_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookies: Vec<Cookie<'_>> = resp.response().cookies().collect();
    assert_eq!(cookies.len(), 2);
    for cookie in &cookies {
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.path(), Some("/"));
        assert!(!cookie.value().is_empty());
    }
    assert!(cookies.iter().any(|c| c.name() == ACCESS_TOKEN_COOKIE));
    assert!(cookies.iter().any(|c| c.name() == REFRESH_TOKEN_COOKIE));

    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn test_refresh_rotates_and_replay_revokes_everything() {
    let ctx = context().await;
    let app = app!(ctx);

    let first = login!(app);
    let first_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": first_refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let second: Value = test::read_body_json(resp).await;
    let second_refresh = second["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(first_refresh, second_refresh);

    // Replaying the consumed token is rejected like any other failure
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": first_refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Authentication failed");

    // ... and takes the legitimate successor down with it
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": second_refresh }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let rows = ctx.tokens.find_by_user_id(ctx.user.id).await.unwrap();
    assert!(rows.iter().all(|row| row.invalidated));
}

#[actix_web::test]
async fn test_refresh_reads_cookie_and_answers_with_cookies() {
    let ctx = context().await;
    let app = app!(ctx);

    let pair = login!(app);
    let refresh_token = pair["refresh_token"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh?use_cookies=true")
        .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, refresh_token.to_string()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let rotated = cookie_value(&resp, REFRESH_TOKEN_COOKIE).unwrap();
    assert_ne!(rotated, refresh_token);
    assert!(cookie_value(&resp, ACCESS_TOKEN_COOKIE).is_some());
}

#[actix_web::test]
async fn test_refresh_without_token_is_unauthorized() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_expired_refresh_token_is_rejected() {
    let ctx = context().await;
    let app = app!(ctx);

    let pair = login!(app);
    ctx.clock.advance(Duration::days(7) + Duration::seconds(1));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair["refresh_token"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_invalidates_token_and_clears_cookies() {
    let ctx = context().await;
    let app = app!(ctx);

    let pair = login!(app);
    let refresh_token = pair["refresh_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, refresh_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(cookie_value(&resp, ACCESS_TOKEN_COOKIE).as_deref(), Some(""));
    assert_eq!(cookie_value(&resp, REFRESH_TOKEN_COOKIE).as_deref(), Some(""));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_without_token_succeeds() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_logout_clears_cookies_even_when_storage_fails() {
    let ctx = context().await;
    let app = app!(ctx);

    let pair = login!(app);
    ctx.tokens.set_fail_writes(true);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .set_json(json!({ "refresh_token": pair["refresh_token"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(cookie_value(&resp, ACCESS_TOKEN_COOKIE).as_deref(), Some(""));
    assert_eq!(cookie_value(&resp, REFRESH_TOKEN_COOKIE).as_deref(), Some(""));
}

#[actix_web::test]
async fn test_me_accepts_bearer_and_cookie() {
    let ctx = context().await;
    let app = app!(ctx);

    let pair = login!(app);
    let access_token = pair["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {access_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], ctx.user.id.to_string());
    assert_eq!(body["username"], "alice");
    assert_eq!(body["roles"], json!(["User", "Admin"]));

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_me_rejects_missing_and_expired_tokens() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Authentication failed");

    let pair = login!(app);
    ctx.clock.advance(Duration::minutes(10));

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((
            header::AUTHORIZATION,
            format!("Bearer {}", pair["access_token"].as_str().unwrap()),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_revoke_sessions_rejects_outstanding_tokens() {
    let ctx = context().await;
    let app = app!(ctx);

    let pair = login!(app);
    let bearer = format!("Bearer {}", pair["access_token"].as_str().unwrap());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sessions/revoke")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The access token carries the old security stamp
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair["refresh_token"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_unknown_route_returns_not_found() {
    let ctx = context().await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/api/v1/unknown").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
}
