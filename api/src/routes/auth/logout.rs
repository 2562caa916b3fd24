use actix_web::{web, HttpRequest, HttpResponse};

use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::PasswordVerifier;

use crate::dto::RefreshTokenRequest;
use crate::handlers::error::handle_domain_error;
use crate::session;

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Invalidates the presented refresh token, taken from the body or the
/// cookie. A missing or unknown token is not an error. Both session cookies
/// are cleared on every outcome.
///
/// # Response
///
/// ## Success (204 No Content)
///
/// ## Errors
/// - 500 Internal Server Error: The token store is unavailable
pub async fn logout<U, R, P>(
    req: HttpRequest,
    state: web::Data<AppState<U, R, P>>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    P: PasswordVerifier + 'static,
{
    let refresh_token = session::refresh_token_from(&req, body.map(web::Json::into_inner));

    let mut response = match state.auth_service.logout(refresh_token.as_deref()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(error) => handle_domain_error(error),
    };

    session::clear_session_cookies(&mut response);
    response
}
