use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_helpers::extractors::validated_json::validation_error_body;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found with id: {0}")]
    NotFound(i64),

    #[error("User not found with email: {0}")]
    NotFoundByEmail(String),

    #[error("User with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Infrastructure failure that may succeed on retry (pool exhausted,
    /// connection refused).
    #[error("Internal error: {0}")]
    Transient(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match &self {
            UserError::Validation(errors) => {
                tracing::info!("Validation failed: {:?}", errors);
                let body = validation_error_body(errors);
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            UserError::NotFound(_) | UserError::NotFoundByEmail(_) => {
                tracing::info!("{}", self);
                message_response(StatusCode::NOT_FOUND, self.to_string())
            }
            UserError::DuplicateEmail(email) => {
                tracing::info!(email = %email, "Duplicate email");
                message_response(StatusCode::CONFLICT, self.to_string())
            }
            UserError::Transient(detail) => {
                tracing::warn!("Transient failure: {}", detail);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            UserError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        }
    }
}

fn message_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = UserError::NotFound(42);
        assert_eq!(err.to_string(), "User not found with id: 42");
    }

    #[test]
    fn test_not_found_by_email_message() {
        let err = UserError::NotFoundByEmail("a@b.com".to_string());
        assert_eq!(err.to_string(), "User not found with email: a@b.com");
    }

    #[test]
    fn test_duplicate_email_message() {
        let err = UserError::DuplicateEmail("a@b.com".to_string());
        assert_eq!(err.to_string(), "User with email a@b.com already exists");
    }

    #[test]
    fn test_internal_message_carries_detail() {
        let err = UserError::Internal("boom".to_string());
        assert_eq!(err.to_string(), "Internal error: boom");
    }
}
