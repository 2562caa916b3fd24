use validator::ValidationErrors;

pub use ks_shared::errors::{error_codes, ErrorResponse};

/// Field-by-field validation failure body
pub fn validation_error_response(errors: &ValidationErrors) -> ErrorResponse {
    errors.field_errors().into_iter().fold(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Request validation failed"),
        |response, (field, field_errors)| {
            let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
            response.add_detail(field, codes)
        },
    )
}
