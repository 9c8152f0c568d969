//! Error types for infobytes-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use infobytes_gen::GenerationError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Wrong or missing admin password (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Admin API disabled (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. duplicate slug or generation on a remote backend
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream service failed (502): remote backend, model or image API
    #[error("Upstream error: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<infobytes_common::Error> for ApiError {
    fn from(err: infobytes_common::Error) -> Self {
        use infobytes_common::Error as E;
        match err {
            E::NotFound(msg) => ApiError::NotFound(msg),
            E::InvalidInput(msg) => ApiError::BadRequest(msg),
            E::Conflict(msg) => ApiError::Conflict(msg),
            E::Http(e) => ApiError::BadGateway(e.to_string()),
            E::Json(e) => ApiError::BadGateway(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Store(e) => e.into(),
            GenerationError::NotFound(id) => ApiError::NotFound(format!("Niche \"{}\" not found", id)),
            GenerationError::InvalidInput(msg) => ApiError::BadRequest(msg),
            GenerationError::NoNiches => ApiError::Conflict(err.to_string()),
            GenerationError::Config(_) => ApiError::Internal(err.to_string()),
            GenerationError::Network(_)
            | GenerationError::Api { .. }
            | GenerationError::EmptyResponse
            | GenerationError::Parse(_) => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match &self {
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
        };

        if status.is_server_error() {
            error!("{} {}: {}", status.as_u16(), error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
