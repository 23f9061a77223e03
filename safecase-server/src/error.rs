//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use safecase_core::SafecaseError;
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - missing owner identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not found - requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Engine error - error from the evidence engine
    #[error("Engine error: {0}")]
    Engine(#[from] SafecaseError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Engine(ref e) => match e {
                SafecaseError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                SafecaseError::NotFound(_) => StatusCode::NOT_FOUND,

                // Blob store or upstream collaborator failed → 502
                SafecaseError::StorageFailure(_)
                | SafecaseError::AnalysisFailure(_)
                | SafecaseError::HttpError(_) => StatusCode::BAD_GATEWAY,

                SafecaseError::PersistenceFailure(_)
                | SafecaseError::ExtractionFailure(_)
                | SafecaseError::Pattern(_)
                | SafecaseError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Engine(ref e) => e.code(),
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            // For engine errors, only input problems are echoed back
            Self::Engine(ref e) => match e {
                SafecaseError::InvalidInput(msg) => msg.clone(),
                SafecaseError::NotFound(what) => format!("{what} not found"),
                SafecaseError::StorageFailure(_) => "Evidence storage is unavailable".to_string(),
                SafecaseError::PersistenceFailure(_) => {
                    "Evidence could not be recorded".to_string()
                }
                SafecaseError::AnalysisFailure(_) | SafecaseError::HttpError(_) => {
                    "Upstream service error".to_string()
                }
                SafecaseError::ExtractionFailure(_) => "Text extraction failed".to_string(),
                SafecaseError::Pattern(_) | SafecaseError::Serialization(_) => {
                    "Internal processing error".to_string()
                }
            },
            // For other errors, use the Display message
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Engine(_) => "engine",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                client_message = %client_message,
                "Server error"
            );
        } else if matches!(self, Self::Unauthorized(_)) {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Authentication error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Client error"
            );
        }

        // All error responses include a `code` field for programmatic error handling
        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
