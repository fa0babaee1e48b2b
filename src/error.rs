use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::dao::{image_store::ImageStoreError, storage::StorageError};

/// Body returned for every server-side failure; details stay in the logs.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed to answer or to persist.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Uploaded image could not be written.
    #[error("image upload failed")]
    Upload(#[source] ImageStoreError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<ImageStoreError> for ServiceError {
    fn from(err: ImageStoreError) -> Self {
        ServiceError::Upload(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::from(err).into()
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Request body exceeded the configured upload limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    /// Internal server error; the message is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            other => AppError::Internal(error_chain(&other)),
        }
    }
}

impl AppError {
    /// Classify a rejected request body: oversized bodies keep their 413, everything else is a 400.
    pub fn rejected_body(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(message)
        } else {
            AppError::BadRequest(message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppError::PayloadTooLarge(message) => {
                (StatusCode::PAYLOAD_TOO_LARGE, message).into_response()
            }
            AppError::Internal(message) => {
                error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
            }
        }
    }
}

/// Render an error and its sources as a single `a: b: c` line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (
                ServiceError::InvalidInput("title: required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::NotFound("item `000` not found".into()),
                StatusCode::NOT_FOUND,
            ),
            (ServiceError::Degraded, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn rejected_bodies_keep_payload_too_large() {
        let response =
            AppError::rejected_body(StatusCode::PAYLOAD_TOO_LARGE, "too big".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = AppError::rejected_body(StatusCode::UNPROCESSABLE_ENTITY, "bad".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_details_stay_in_the_message_chain() {
        let io = std::io::Error::other("connection refused");
        let err = ServiceError::Storage(StorageError::unavailable("ping failed".into(), io));

        let AppError::Internal(message) = AppError::from(err) else {
            panic!("storage failures must be internal errors");
        };
        assert!(message.contains("connection refused"));
    }
}
