//! Picker error types with HTTP status code mapping.
//!
//! [`PickerError`] is the central error type. Each variant maps to a
//! numeric code, an HTTP status, and a structured JSON error response.
//! Field-level problems inside documents never become errors: they are
//! repaired by defaulting while the document is decoded.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "unsupported schema version 0"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Document / input  | 400 Bad Request / 422        |
/// | 2000–2999 | State             | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / storage  | 500 / 503                    |
/// | 4000–4999 | Text recognition  | 502 / 504                    |
#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    /// Document syntax or shape is malformed.
    #[error("malformed document: {0}")]
    Parse(String),

    /// Document schema version cannot be used or migrated.
    #[error("unsupported schema version {found}")]
    Version {
        /// Version found in the document, as written.
        found: String,
    },

    /// Request input is invalid.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A draw is running; interactive edits wait until it resolves.
    #[error("a draw is in progress")]
    DrawInProgress,

    /// No roster entry has the given key.
    #[error("name not found: {0}")]
    NameNotFound(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Text recognition did not answer in time.
    #[error("text recognition timed out after {secs} s")]
    RecognitionTimeout {
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },

    /// Text recognition is not configured.
    #[error("text recognition is disabled")]
    OcrDisabled,

    /// Reading or writing local storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PickerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Parse(_) => 1001,
            Self::Version { .. } => 1002,
            Self::Validation(_) => 1003,
            Self::NameNotFound(_) => 2001,
            Self::DrawInProgress => 2002,
            Self::Internal(_) => 3000,
            Self::Storage(_) => 3001,
            Self::OcrDisabled => 3002,
            Self::Recognition(_) => 4001,
            Self::RecognitionTimeout { .. } => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Parse(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Version { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NameNotFound(_) => StatusCode::NOT_FOUND,
            Self::DrawInProgress => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OcrDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Recognition(_) => StatusCode::BAD_GATEWAY,
            Self::RecognitionTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Returns `true` for the text-recognition failures.
    #[must_use]
    pub const fn is_recognition(&self) -> bool {
        matches!(self, Self::Recognition(_) | Self::RecognitionTimeout { .. })
    }
}

impl From<serde_json::Error> for PickerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for PickerError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl IntoResponse for PickerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_recognition() {
            tracing::warn!(error = %self, "text recognition request failed");
        } else if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_error_maps_to_unprocessable() {
        let err = PickerError::Version {
            found: "0".to_string(),
        };
        assert_eq!(err.error_code(), 1002);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "unsupported schema version 0");
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{not json")
            .map_err(PickerError::from)
            .err();
        assert!(matches!(err, Some(PickerError::Parse(_))));
    }

    #[test]
    fn io_errors_become_storage_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PickerError::from(io);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn recognition_variants_are_flagged() {
        assert!(PickerError::RecognitionTimeout { secs: 60 }.is_recognition());
        assert!(PickerError::Recognition("engine crashed".into()).is_recognition());
        assert!(!PickerError::DrawInProgress.is_recognition());
    }

    #[test]
    fn into_response_sets_status() {
        let response = PickerError::DrawInProgress.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
