//! Shared API types
//!
//! Error responses and pagination validation used by every endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use utoipa::ToSchema;
use validator::ValidationError;

use crate::core::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::data::DataError;
use crate::data::filters::FilterError;

/// Validator function for limit parameter
pub fn validate_limit(limit: u32) -> Result<(), ValidationError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::new("limit_range")
            .with_message(format!("Limit must be between 1 and {}", MAX_PAGE_LIMIT).into()));
    }
    Ok(())
}

pub fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        code: String,
        message: String,
    },
    /// Filter text that failed to compile; carries where it failed
    InvalidFilter {
        message: String,
        stage: &'static str,
        position: Option<usize>,
    },
    NotFound {
        code: String,
        message: String,
    },
    ServiceUnavailable {
        message: String,
    },
    Internal {
        message: String,
    },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn invalid_filter(e: &FilterError) -> Self {
        Self::InvalidFilter {
            message: e.to_string(),
            stage: e.stage().as_str(),
            position: e.position(),
        }
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::InvalidFilter(e) => Self::invalid_filter(&e),
            e if e.is_transient() => {
                tracing::warn!(error = %e, "Transient data error");
                Self::ServiceUnavailable {
                    message: "Database temporarily unavailable".to_string(),
                }
            }
            e => {
                tracing::error!(error = %e, "Data error");
                Self::internal("Database operation failed")
            }
        }
    }
}

/// Error body shape, for the OpenAPI document
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub message: String,
    /// Present for `INVALID_FILTER`: `lexing`, `parsing` or `compiling`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Character offset of the failure, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest { code, message } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": "bad_request", "code": code, "message": message}),
            ),
            Self::InvalidFilter {
                message,
                stage,
                position,
            } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "bad_request",
                    "code": "INVALID_FILTER",
                    "message": message,
                    "stage": stage,
                    "position": position,
                }),
            ),
            Self::NotFound { code, message } => (
                StatusCode::NOT_FOUND,
                serde_json::json!({"error": "not_found", "code": code, "message": message}),
            ),
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "error": "service_unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "message": message,
                }),
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"error": "internal_error", "code": "INTERNAL", "message": message}),
            ),
        };
        (status, Json(body)).into_response()
    }
}
