//! Mapping of domain errors onto HTTP responses
//!
//! Every authentication failure collapses into one 401 body so callers
//! cannot tell an expired token from a replayed one or a wrong password
//! from an unknown user. The distinction only reaches the logs.

use actix_web::{error::InternalError, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use ks_core::errors::{DomainError, TokenError};

use crate::dto::{error_codes, validation_error_response, ErrorResponse};

/// Message shared by every 401 response
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// The uniform 401 response
pub fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(error_codes::UNAUTHORIZED, AUTHENTICATION_FAILED))
}

/// Convert a domain error into its HTTP response
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let generation_failed = matches!(error, DomainError::Token(TokenError::TokenGenerationFailed));
    if error.is_authentication_failure() && !generation_failed {
        // Reuse is already reported at warn by the rotation
        match &error {
            DomainError::Token(TokenError::Expired) => tracing::debug!("Rejected expired token"),
            other => tracing::info!(reason = %other, "Authentication failed"),
        }
        return unauthorized_response();
    }

    match error {
        DomainError::Validation { message } => {
            HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::VALIDATION_ERROR, message))
        }
        DomainError::ValidationErr(e) => {
            HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::VALIDATION_ERROR, e.to_string()))
        }
        DomainError::NotFound { resource } => HttpResponse::NotFound().json(ErrorResponse::new(
            error_codes::NOT_FOUND,
            format!("{resource} not found"),
        )),
        other => {
            tracing::error!(error = %other, "Request failed with an internal error");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                "An internal error occurred",
            ))
        }
    }
}

/// 400 response for a request body that failed validation
pub fn handle_validation_errors(errors: &ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(validation_error_response(errors))
}

/// Error handler for malformed JSON bodies and query strings
pub fn handle_payload_error<E>(error: E, _req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::BAD_REQUEST, error.to_string()));
    InternalError::from_response(error, response).into()
}
