//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::backend::domain::DomainError;

/// Status code and machine-readable code of a domain error
pub fn status_of(error: &DomainError) -> (StatusCode, &'static str) {
    match error {
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DomainError::AccessDenied(_) => (StatusCode::FORBIDDEN, "ACCESS_DENIED"),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        DomainError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

/// JSON error response for a failed domain operation. Storage details are
/// logged but not sent to the client.
pub fn domain_error_response(action: &str, error: DomainError) -> Response {
    let (status, code) = status_of(&error);
    let message = match &error {
        DomainError::Storage(e) => {
            error!("Failed to {}: {:#}", action, e);
            "Internal server error".to_string()
        }
        other => {
            warn!("Failed to {}: {}", action, other);
            other.to_string()
        }
    };

    error_response(status, code, message)
}

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = json!({
        "error": message.into(),
        "code": code,
    });
    (status, Json(body)).into_response()
}
