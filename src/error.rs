//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// No route matches the method and path
    #[error("Not Found")]
    RouteNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, error, details) = match self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg, None),
            AppError::NotFound(msg) => ("NOT_FOUND", msg, None),
            AppError::RouteNotFound => ("ROUTE_NOT_FOUND", "Not Found".to_string(), None),
            AppError::Conflict(msg) => {
                warn!("Conflict: {}", msg);
                ("CONFLICT", msg, None)
            }
            AppError::Store(e) => {
                error!("Persistence error: {:?}", e);
                (
                    "PERSISTENCE_ERROR",
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                ("INTERNAL_ERROR", "Internal server error".to_string(), Some(msg))
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error,
            message: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let (status, body) = response_parts(validation_error("Missing required fields")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.error, "Missing required fields");
        assert!(body.message.is_none());
        assert_eq!(body.code.as_deref(), Some("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn route_not_found_uses_fixed_text() {
        let (status, body) = response_parts(AppError::RouteNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Not Found");
    }

    #[tokio::test]
    async fn store_fault_text_is_passed_through() {
        let err = AppError::from(StoreError::Other("connection refused".into()));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.message.as_deref(), Some("connection refused"));
    }

    #[test]
    fn status_mapping_is_exhaustive() {
        assert_eq!(not_found_error("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
