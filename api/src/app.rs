//! Application factory
//!
//! Builds the Actix-web application around a shared `AppState`. The factory
//! is generic over the repositories and password verifier, so tests can run
//! the real routing against in-memory implementations.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::{JsonPayloadError, QueryPayloadError},
    web, App, Error, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::PasswordVerifier;

use crate::dto::{error_codes, ErrorResponse};
use crate::handlers::error::handle_payload_error;
use crate::middleware::auth::{Authenticator, JwtAuth};
use crate::routes::auth::{
    login::login, logout::logout, me::me, refresh::refresh, register::register,
    revoke::revoke_sessions, AppState,
};

/// Default limit for JSON request bodies
pub const DEFAULT_JSON_LIMIT: usize = 64 * 1024;

/// Create and configure the application with all dependencies
pub fn create_app<U, R, P>(
    app_state: web::Data<AppState<U, R, P>>,
    json_limit: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    P: PasswordVerifier + 'static,
{
    let authenticator: Arc<dyn Authenticator> = app_state.auth_service.clone();
    let jwt_auth = JwtAuth::new(authenticator);

    App::new()
        .app_data(app_state)
        .app_data(
            web::JsonConfig::default()
                .limit(json_limit)
                .error_handler(handle_payload_error::<JsonPayloadError>),
        )
        .app_data(web::QueryConfig::default().error_handler(handle_payload_error::<QueryPayloadError>))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1/auth")
                .route("/register", web::post().to(register::<U, R, P>))
                .route("/login", web::post().to(login::<U, R, P>))
                .route("/refresh", web::post().to(refresh::<U, R, P>))
                .route("/logout", web::post().to(logout::<U, R, P>))
                .service(
                    web::resource("/sessions/revoke")
                        .wrap(jwt_auth.clone())
                        .route(web::post().to(revoke_sessions::<U, R, P>)),
                )
                .service(
                    web::resource("/me")
                        .wrap(jwt_auth)
                        .route(web::get().to(me)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "keystone-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
