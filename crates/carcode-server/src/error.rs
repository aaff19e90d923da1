//! Error handling for the API server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use carcode_registry::{RegistryError, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
            ),
            ApiError::Registry(e) => match e {
                RegistryError::InvalidCandidate(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                RegistryError::DuplicateIdentifier(_) => (StatusCode::CONFLICT, e.to_string()),
                RegistryError::NotFound(_) | RegistryError::RecordNotFound(_) => {
                    (StatusCode::NOT_FOUND, e.to_string())
                }
                RegistryError::CodeGenerationFailed { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
                RegistryError::StoreUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Record store unavailable".to_string(),
                ),
                RegistryError::IoFailure(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File storage error".to_string(),
                ),
                RegistryError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, e.to_string()),
            },
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Convenience functions for common errors
impl ApiError {
    pub fn bad_request(msg: &str) -> Self {
        Self::BadRequest(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carcode::{CodeError, RecordError};
    use carcode_registry::GenerationError;
    use std::time::Duration;

    fn status(e: impl Into<ApiError>) -> StatusCode {
        e.into().into_response().status()
    }

    #[test]
    fn test_user_errors_are_client_errors() {
        assert_eq!(
            status(RegistryError::DuplicateIdentifier("ABC-001".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(RegistryError::InvalidCandidate(RecordError::MissingField("vin"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(RegistryError::NotFound("ABC-001.png".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(ApiError::validation("bad code type")), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_system_errors_are_server_errors() {
        let generation = RegistryError::CodeGenerationFailed {
            reg_no: "ÄBC".into(),
            source: GenerationError::Encode(CodeError::UnsupportedPayload("non-ASCII".into())),
        };
        assert_eq!(status(generation), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(RegistryError::StoreUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(RegistryError::Timeout {
                operation: "record lookup",
                after: Duration::from_secs(10),
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_generation_failure_message_keeps_cause() {
        let error = ApiError::from(RegistryError::CodeGenerationFailed {
            reg_no: "ÄBC".into(),
            source: GenerationError::Encode(CodeError::UnsupportedPayload(
                "character 'Ä' is outside printable ASCII".into(),
            )),
        });

        let (_, message) = error.status_and_message();
        assert!(message.contains("outside printable ASCII"));
    }
}
