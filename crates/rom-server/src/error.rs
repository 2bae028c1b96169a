//! API error type and its JSON response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rom_session::AnalysisError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    /// Invalid request data (400)
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Internal server error (500)
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Error from the analysis pipeline
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "Session".to_string(),
            id: session_id.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Analysis(AnalysisError::SessionNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Analysis(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Analysis(err) => match err {
                AnalysisError::UnsupportedBodyPart { .. } => "UNSUPPORTED_BODY_PART",
                AnalysisError::UnsupportedMovement { .. } => "UNSUPPORTED_MOVEMENT",
                AnalysisError::InvalidSessionId { .. } => "INVALID_SESSION_ID",
                AnalysisError::SessionNotFound { .. } => "NOT_FOUND",
                AnalysisError::Storage(_) => "STORAGE_ERROR",
                _ => "ANALYSIS_ERROR",
            },
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Supported alternatives for unsupported body parts or movements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "API error");
        } else {
            tracing::warn!(error = %self, "API error");
        }

        let available = match &self {
            Self::Analysis(
                AnalysisError::UnsupportedBodyPart { available, .. }
                | AnalysisError::UnsupportedMovement { available, .. },
            ) => Some(available.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            available,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
