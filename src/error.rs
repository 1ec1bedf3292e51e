//! # Error Handling
//!
//! `AppError` is what handlers return. Its `ResponseError` impl turns every
//! variant into a JSON body of the same shape:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "Both reference and hypothesis must be non-empty strings",
//!     "timestamp": "2025-01-01T12:00:00Z"
//!   }
//! }
//! ```
//!
//! Failures caused by the caller's text map to 4xx; provider failures map to
//! 502 and everything unexpected to 500.

use crate::provider::ProviderError;
use crate::wer::WerError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Unexpected server-side failure
    Internal(String),

    /// Malformed request (bad JSON, wrong field types)
    BadRequest(String),

    NotFound(String),

    /// Missing or invalid configuration, e.g. no provider key
    ConfigError(String),

    /// Well-formed request whose content was rejected
    ValidationError(String),

    /// Input above the configured size ceiling
    PayloadTooLarge(String),

    /// The speech-to-text provider failed
    Upstream(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.as_str()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.as_str()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.as_str()),
            AppError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.as_str()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg.as_str()),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg.as_str()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, error_type, message) = self.parts();

        HttpResponse::build(status).json(json!({
            "error": {
                "type": error_type,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        }))
    }
}

impl From<WerError> for AppError {
    fn from(err: WerError) -> Self {
        match err {
            WerError::InvalidInput | WerError::DegenerateInput => {
                AppError::ValidationError(err.to_string())
            }
            WerError::AlignmentOverflow { .. } | WerError::AlignmentTooLarge { .. } => {
                AppError::PayloadTooLarge(err.to_string())
            }
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::Internal(format!("Scoring task failed: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
