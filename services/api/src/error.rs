//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
///
/// Every handler maps its failures to one of these variants; nothing
/// escapes to the transport layer unmapped.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed required fields
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Acting user lacks permission over the target resource
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique key
    #[error("Duplicate value for {field}")]
    Conflict { field: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Unexpected failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Whether error detail may be included in response bodies
fn is_development() -> bool {
    std::env::var("APP_ENV").is_ok_and(|v| v == "development")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "message": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "message": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            ApiError::Conflict { field } => (
                StatusCode::CONFLICT,
                json!({ "message": format!("Duplicate value for {}", field), "field": field }),
            ),
            ApiError::Database(e) => internal_body(&e.to_string()),
            ApiError::Internal(e) => internal_body(&format!("{:#}", e)),
        };

        (status, Json(body)).into_response()
    }
}

fn internal_body(detail: &str) -> (StatusCode, serde_json::Value) {
    let body = if is_development() {
        json!({ "message": "Internal server error", "detail": detail })
    } else {
        json!({ "message": "Internal server error" })
    };
    (StatusCode::INTERNAL_SERVER_ERROR, body)
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("no".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict {
                field: "emailId".into()
            }
            .into_response()
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
