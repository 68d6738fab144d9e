//! Gateway error types and their HTTP rendering.
//!
//! Every error body has the same shape:
//!
//! ```json
//! {"timestamp": "...", "status": 400, "error": "Validation Error", "message": "..."}
//! ```
//!
//! Messages are fixed strings chosen here. Primitive error text, key bytes and
//! message bytes never reach a body.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use super::config::ConfigError;

/// `error` titles used in response bodies
pub mod titles {
    pub const MALFORMED_JSON: &str = "Malformed JSON Request";
    pub const VALIDATION: &str = "Validation Error";
    pub const INVALID_FORMAT: &str = "Invalid Key or Parameter Format";
    pub const CRYPTOGRAPHY: &str = "Cryptography Error";
    pub const ACCESS_DENIED: &str = "Access denied";
    pub const TOO_MANY_REQUESTS: &str = "Too Many Requests";
    pub const INTERNAL: &str = "Internal Crypto Error";
}

/// Error returned to HTTP callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Short title
    pub error: &'static str,
    /// Human-readable detail
    pub message: String,
    /// Seconds until a rate-limited caller may retry
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    /// Body is not valid JSON or has the wrong field types
    pub fn malformed_json() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            titles::MALFORMED_JSON,
            "Request body is not valid JSON for this operation",
        )
    }

    /// A required field is missing or blank
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, titles::VALIDATION, message)
    }

    /// Caller-supplied key, ciphertext or signature could not be used
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, titles::INVALID_FORMAT, message)
    }

    /// The primitive rejected well-formed input
    pub fn crypto_failure() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            titles::CRYPTOGRAPHY,
            "The cryptographic operation could not be completed",
        )
    }

    /// Client address failed the allow-list
    pub fn not_whitelisted() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            titles::ACCESS_DENIED,
            "Client address is not whitelisted",
        )
    }

    /// Client exhausted its token bucket
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            retry_after_secs: Some(retry_after_secs),
            ..Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                titles::TOO_MANY_REQUESTS,
                "Rate limit exceeded",
            )
        }
    }

    /// Anything unexpected, including panics
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            titles::INTERNAL,
            "Operation failed safely.",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status.as_u16(), self.error, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    timestamp: String,
    status: u16,
    error: &'a str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: self.status.as_u16(),
            error: self.error,
            message: &self.message,
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and serving, not per request)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Metrics registry could not be built
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<pqc_telemetry::TelemetryError> for GatewayError {
    fn from(e: pqc_telemetry::TelemetryError) -> Self {
        GatewayError::Telemetry(e.to_string())
    }
}
