use actix_web::{web, HttpResponse};
use validator::Validate;

use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::PasswordVerifier;

use crate::dto::{LoginRequest, SessionQuery};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};
use crate::session;

use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// # Request Body
///
/// ```json
/// {
///     "username": "alice",
///     "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// With `?use_cookies=true` the body is empty and the tokens are set as
/// cookies. Otherwise:
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "3q2-7w...",
///     "access_token_expires_in": 600,
///     "refresh_token_expires_in": 604800
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing or oversized username or password
/// - 401 Unauthorized: Unknown user or wrong password
pub async fn login<U, R, P>(
    state: web::Data<AppState<U, R, P>>,
    query: web::Query<SessionQuery>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    P: PasswordVerifier + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.auth_service.login(&request.username, &request.password).await {
        Ok(pair) => session::deliver(pair, query.use_cookies),
        Err(error) => handle_domain_error(error),
    }
}
