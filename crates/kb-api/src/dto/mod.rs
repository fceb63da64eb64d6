//! Request and response DTOs.

pub mod request;
pub mod response;

use validator::Validate;

use kb_core::error::AppError;

/// Run the derived validation rules of a request body.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}
