use actix_web::{web, HttpResponse};

use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::PasswordVerifier;

use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::Authenticated;
use crate::session;

use super::AppState;

/// Handler for POST /api/v1/auth/sessions/revoke
///
/// Signs the caller out everywhere: outstanding access tokens stop being
/// accepted and every refresh token is invalidated.
/// Requires authentication via Bearer token or the access token cookie.
///
/// # Response
///
/// ## Success (204 No Content)
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
pub async fn revoke_sessions<U, R, P>(
    state: web::Data<AppState<U, R, P>>,
    auth: Authenticated,
) -> HttpResponse
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    P: PasswordVerifier + 'static,
{
    let mut response = match state.auth_service.revoke_all_sessions(auth.user_id).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(error) => return handle_domain_error(error),
    };

    session::clear_session_cookies(&mut response);
    response
}
