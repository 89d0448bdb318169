//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::BackendError;
use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache layer and its HTTP front end.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend failed; the original error is kept as the source
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// An envelope or payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Fuzz factor outside `[0, 1]`, NaN or infinite
    #[error("Invalid fuzz factor: {0} (expected a value between 0 and 1)")]
    InvalidFuzzFactor(f64),

    /// A present payload encodes to `null`, which would read back as absent
    #[error("Payload encodes to null and cannot be told apart from a miss")]
    NullPayload,

    /// No payload stored under the key (HTTP layer only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_)
            | CacheError::InvalidFuzzFactor(_)
            | CacheError::NullPayload => StatusCode::BAD_REQUEST,
            CacheError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_backend_error_keeps_source() {
        let source: BackendError = "connection reset".into();
        let err = CacheError::from(source);

        assert_eq!(err.to_string(), "Backend error: connection reset");
        assert_eq!(err.source().unwrap().to_string(), "connection reset");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidFuzzFactor(2.0), StatusCode::BAD_REQUEST),
            (CacheError::NullPayload, StatusCode::BAD_REQUEST),
            (CacheError::Backend("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
