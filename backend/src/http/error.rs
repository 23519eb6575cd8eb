//! HTTP error handling and response types.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::advisor::AiError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Primary store is down and the route cannot use the fallback
    ServiceUnavailable(String),
    /// No generative-AI backend configured
    AiNotConfigured(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AiNotConfigured(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Repository(e) => match e {
                RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                RepositoryError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                RepositoryError::ConnectionError { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::NotFound(msg) => ApiError::new("NOT_FOUND", msg),
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::ServiceUnavailable(msg) => ApiError::new("SERVICE_UNAVAILABLE", msg),
            AppError::AiNotConfigured(details) => {
                ApiError::new("AI_NOT_CONFIGURED", "AI service not configured")
                    .with_details(details)
            }
            AppError::Internal(msg) => ApiError::new("INTERNAL_ERROR", msg),
            AppError::Repository(e) => {
                let code = match e {
                    RepositoryError::NotFound { .. } => "NOT_FOUND",
                    RepositoryError::ValidationError { .. } => "VALIDATION_ERROR",
                    RepositoryError::ConnectionError { .. } => "SERVICE_UNAVAILABLE",
                    _ => "REPOSITORY_ERROR",
                };
                let body = ApiError::new(code, e.message());
                if status.is_server_error() {
                    body.with_details(e.to_string())
                } else {
                    body
                }
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Config { message } => AppError::AiNotConfigured(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_status() {
        let cases = [
            (RepositoryError::not_found("Farm not found"), StatusCode::NOT_FOUND),
            (RepositoryError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                RepositoryError::connection("Database not connected"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RepositoryError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_missing_ai_key_is_500() {
        let err = AppError::from(AiError::Config {
            message: "GEMINI_API_KEY is not set".to_string(),
        });
        assert!(matches!(err, AppError::AiNotConfigured(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_body_omits_empty_details() {
        let json = serde_json::to_value(ApiError::new("NOT_FOUND", "Farm not found")).unwrap();
        assert_eq!(json["error"], "Farm not found");
        assert!(json.get("details").is_none());
    }
}
