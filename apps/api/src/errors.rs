use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::embedding::EmbeddingError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Embedding(e) => {
                tracing::error!("Embedding error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMBEDDING_ERROR",
                    format!("The embedding provider failed: {e}"),
                )
            }
            AppError::Classification(msg) => {
                tracing::error!("Classification error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "CLASSIFICATION_ERROR",
                    format!("The classifier failed: {msg}"),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let (status, code, message) = AppError::Validation("text cannot be empty".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "text cannot be empty");
    }

    #[test]
    fn test_embedding_failure_maps_to_bad_gateway_with_context() {
        let err = AppError::from(EmbeddingError::Api {
            status: 503,
            message: "model loading".into(),
        });
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "EMBEDDING_ERROR");
        assert!(message.contains("model loading"));
    }

    #[test]
    fn test_llm_error_hides_details() {
        let (status, code, message) = AppError::Llm("upstream said: secret detail".into()).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "LLM_ERROR");
        assert!(!message.contains("secret"));
    }
}
