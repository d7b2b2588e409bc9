//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::EngineError;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (NOT_FOUND, INSUFFICIENT_FUNDS, ALREADY_PROCESSED, etc.)
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    NotFound(String),
    BadRequest { code: &'static str, message: String },
    Unauthorized(String),
    InternalError(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest {
                code: "BAD_REQUEST",
                message,
            },
            request_id,
        }
    }

    pub fn unauthorized(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized(message),
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::InternalError(message),
            request_id,
        }
    }

    /// Map an engine error onto the HTTP taxonomy
    pub fn from_engine(request_id: String, err: EngineError) -> Self {
        let kind = match err {
            EngineError::Validation(_)
            | EngineError::InvalidAmount(_)
            | EngineError::InvalidNumberRange { .. } => ApiErrorKind::BadRequest {
                code: "BAD_REQUEST",
                message: err.to_string(),
            },
            EngineError::InsufficientFunds { .. } => ApiErrorKind::BadRequest {
                code: "INSUFFICIENT_FUNDS",
                message: err.to_string(),
            },
            EngineError::AlreadyProcessed(_) => ApiErrorKind::BadRequest {
                code: "ALREADY_PROCESSED",
                message: err.to_string(),
            },
            EngineError::NotFound(_) | EngineError::ReferenceNotFound(_) => {
                ApiErrorKind::NotFound(err.to_string())
            }
            // Internals are logged at the engine boundary, not leaked.
            EngineError::Internal(_) => {
                ApiErrorKind::InternalError("internal failure".to_string())
            }
        };
        Self { kind, request_id }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
            ApiErrorKind::BadRequest { code, message } => {
                write!(f, "[{}] {}: {}", self.request_id, code, message)
            }
            ApiErrorKind::Unauthorized(msg) => {
                write!(f, "[{}] Unauthorized: {}", self.request_id, msg)
            }
            ApiErrorKind::InternalError(msg) => {
                write!(f, "[{}] Internal Error: {}", self.request_id, msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.kind {
            ApiErrorKind::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiErrorKind::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, *code, message.clone())
            }
            ApiErrorKind::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            ApiErrorKind::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id.clone(),
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_engine_error_codes() {
        let err = ApiError::from_engine(
            "req-1".to_string(),
            EngineError::InsufficientFunds {
                required: dec!(60),
                available: dec!(40),
            },
        );
        assert!(matches!(
            err.kind,
            ApiErrorKind::BadRequest {
                code: "INSUFFICIENT_FUNDS",
                ..
            }
        ));

        let err = ApiError::from_engine(
            "req-2".to_string(),
            EngineError::AlreadyProcessed("deposit 1".to_string()),
        );
        assert!(matches!(
            err.kind,
            ApiErrorKind::BadRequest {
                code: "ALREADY_PROCESSED",
                ..
            }
        ));
    }

    #[test]
    fn test_internal_error_does_not_leak() {
        let err = ApiError::from_engine(
            "req-3".to_string(),
            EngineError::Internal("lock poisoned at shard 7".to_string()),
        );
        match err.kind {
            ApiErrorKind::InternalError(msg) => assert!(!msg.contains("shard")),
            other => panic!("unexpected kind: {:?}", other),
        }
    }
}
