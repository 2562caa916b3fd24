use actix_web::HttpResponse;

use crate::middleware::auth::Authenticated;

/// Handler for GET /api/v1/auth/me
///
/// Returns the identity carried by the caller's access token.
///
/// ## Success (200 OK)
/// ```json
/// {
///     "user_id": "550e8400-e29b-41d4-a716-446655440000",
///     "username": "alice",
///     "roles": ["User"],
///     "jti": "6f1c..."
/// }
/// ```
pub async fn me(auth: Authenticated) -> HttpResponse {
    HttpResponse::Ok().json(auth.0)
}
