//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its HTTP boundary.
///
/// A missing or expired key is not an error; reads return `Ok(None)`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Bearer credential missing or wrong
    #[error("Unauthorized")]
    Unauthorized,

    /// Backing storage cannot be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Caller supplied an unusable argument (e.g. zero TTL)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            CacheError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::StorageUnavailable(detail) => {
                error!(%detail, "cache storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Cache temporarily unavailable".to_string(),
                )
            }
            CacheError::Internal(detail) => {
                error!(%detail, "internal cache error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
