// src/api/error.rs
// Centralized error taxonomy for HTTP API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::llm::GenerationError;
use crate::store::StoreError;

/// Everything a turn can fail with, mapped one-to-one onto response codes.
/// Persistence failures after a successful generation call deliberately do
/// NOT appear here: they are logged on the handler path while the reply is
/// still returned (the write is lost, the next turn may see stale state).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed turn fields. No state touched.
    #[error("{0}")]
    Validation(String),
    /// Unknown or absent session code. No session created.
    #[error("unknown or missing session code")]
    Auth,
    /// Generation service non-success, timeout, or unparsable/empty
    /// content. Session state unchanged, so the turn is retryable.
    #[error("generation service failed: {detail}")]
    Upstream { status: Option<u16>, detail: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth => StatusCode::UNAUTHORIZED,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Auth => "AUTH_ERROR",
            ApiError::Upstream { .. } => "UPSTREAM_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Upstream { status, detail } => ApiError::Upstream {
                status: Some(status),
                detail,
            },
            GenerationError::Transport(e) => ApiError::Upstream {
                status: None,
                detail: e.to_string(),
            },
            GenerationError::EmptyContent => ApiError::Upstream {
                status: None,
                detail: "generation response carried no extractable text".to_string(),
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(format!("session store failure: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": true,
            "message": self.to_string(),
            "status": status.as_u16(),
            "error_code": self.error_code(),
        });
        if let ApiError::Upstream { status: Some(upstream), .. } = &self {
            body["upstream_status"] = json!(upstream);
        }
        if status.is_server_error() {
            error!("api error: {}", self);
        }
        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
