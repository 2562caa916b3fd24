use actix_web::{web, HttpResponse};
use validator::Validate;

use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::PasswordVerifier;

use crate::dto::{RegisterRequest, RegisterResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};

use super::AppState;

/// Handler for POST /api/v1/auth/register
///
/// # Request Body
///
/// ```json
/// {
///     "username": "bob",
///     "password": "Secret123"
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// {
///     "id": "7d4e1c4a-..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Weak password, oversized input or username taken
pub async fn register<U, R, P>(
    state: web::Data<AppState<U, R, P>>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    P: PasswordVerifier + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.auth_service.register(&request.username, &request.password).await {
        Ok(id) => HttpResponse::Created().json(RegisterResponse { id }),
        Err(error) => handle_domain_error(error),
    }
}
