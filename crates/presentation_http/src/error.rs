//! API error handling
//!
//! "Not found" is answered with a bare 404. Everything else is an internal
//! error whose detail is logged, never returned to the client.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                let body = ErrorResponse {
                    error: "An internal error occurred".to_string(),
                    code: "internal_error".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            },
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Store(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn api_error_messages() {
        assert_eq!(ApiError::NotFound.to_string(), "Not found");
        assert_eq!(
            ApiError::Internal("lock".to_string()).to_string(),
            "Internal error: lock"
        );
    }

    #[test]
    fn store_error_maps_to_internal() {
        assert!(matches!(
            ApiError::from(ApplicationError::Store("down".to_string())),
            ApiError::Internal(msg) if msg == "down"
        ));
    }

    #[tokio::test]
    async fn not_found_has_empty_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let response = ApiError::Internal("/var/lib/secret".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "internal_error");
        assert!(!json["error"].as_str().unwrap().contains("secret"));
    }
}
