//! Request-level error taxonomy.
//!
//! Every externally-facing failure is translated into one of these kinds
//! before it reaches the wire. Internal detail (store errors, panics in
//! dependencies) is logged, never echoed in a response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input. Carries a user-facing summary.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired credential. Deliberately carries no
    /// detail so "unknown user" and "wrong password" read the same.
    #[error("Invalid credentials")]
    Unauthorized,

    /// Referenced entity does not exist. Carries the entity label.
    #[error("{0} not found")]
    NotFound(String),

    /// A backing dependency failed. Fatal to this request only.
    #[error("dependency failure: {0}")]
    Dependency(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Resource".to_string()),
            StoreError::Unavailable(detail) => ApiError::Dependency(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} not found", entity))
            }
            ApiError::Dependency(detail) => {
                tracing::error!("dependency failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message
        }));
        (status, body).into_response()
    }
}
