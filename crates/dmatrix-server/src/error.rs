//! API error taxonomy with contractual status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use dmatrix_core::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Required field absent; rejected before any store interaction.
    #[error("{0}")]
    MalformedInput(String),
    /// Field present but semantically inadmissible.
    #[error("{0}")]
    InvalidInput(String),
    /// Result fetched before the job reached `complete`.
    #[error("Computation is not ready yet.")]
    NotReady,
    /// The fingerprinted resource is no longer retrievable; the client
    /// must resubmit from scratch.
    #[error("Result expired. POST again.")]
    Expired,
    /// Execution capacity exhausted.
    #[error("computation queue is full, try again later")]
    Backpressure,
    /// Store or engine failure, with the underlying cause.
    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotReady => StatusCode::FORBIDDEN,
            ApiError::Expired | ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Backpressure => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        if err.is_malformed() {
            ApiError::MalformedInput(err.to_string())
        } else {
            ApiError::InvalidInput(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_the_contract() {
        assert_eq!(
            ApiError::MalformedInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidInput("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::NotReady.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Expired.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::Backpressure.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn expired_message_tells_the_client_to_resubmit() {
        assert_eq!(ApiError::Expired.to_string(), "Result expired. POST again.");
    }
}
