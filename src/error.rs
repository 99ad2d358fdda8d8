//! Error types shared by the store, the view assembler and the HTTP layer.
//!
//! Store and validation failures are typed with `thiserror`; the HTTP layer
//! folds them into [`ApiError`], which owns the status-code mapping. Startup
//! code (config, schema, server bind) stays on `anyhow`.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

// ---

/// Failure inside a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database rejected or failed a query.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document could not be encoded or decoded.
    #[error("stored record is malformed: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Error returned by every HTTP handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        let error = match &self {
            ApiError::Store(e) => {
                tracing::error!("store failure: {}", e);
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_status_mapping() {
        // ---
        assert_eq!(
            ApiError::not_found("property prop-9").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ValidationError::new("name must not be empty")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let codec = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(
            ApiError::from(StoreError::from(codec)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        // ---
        let err = ApiError::not_found("property prop-404");
        assert_eq!(err.to_string(), "property prop-404 not found");
    }
}
