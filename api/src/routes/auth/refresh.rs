use actix_web::{web, HttpRequest, HttpResponse};

use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::PasswordVerifier;

use crate::dto::{RefreshTokenRequest, SessionQuery};
use crate::handlers::error::{handle_domain_error, unauthorized_response};
use crate::session;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new pair. The presented token is
/// consumed; presenting it again revokes every session of its owner.
///
/// The token is read from the JSON body, or from the refresh token cookie
/// when the body carries none.
///
/// # Request Body (optional)
///
/// ```json
/// {
///     "refresh_token": "3q2-7w..."
/// }
/// ```
///
/// # Response
///
/// Same as login.
///
/// ## Errors
/// - 401 Unauthorized: Missing, unknown, expired or replayed refresh token
pub async fn refresh<U, R, P>(
    req: HttpRequest,
    state: web::Data<AppState<U, R, P>>,
    query: web::Query<SessionQuery>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    P: PasswordVerifier + 'static,
{
    let Some(refresh_token) = session::refresh_token_from(&req, body.map(web::Json::into_inner)) else {
        tracing::debug!("Refresh without refresh token");
        return unauthorized_response();
    };

    match state.auth_service.refresh(&refresh_token).await {
        Ok(pair) => session::deliver(pair, query.use_cookies),
        Err(error) => handle_domain_error(error),
    }
}
