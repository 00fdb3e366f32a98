//! Error types for Assetdesk
//!
//! Every failure (local lookups, validation, remote HTTP calls) is normalized into
//! [`AppError`], which carries a message plus an optional HTTP status, machine code
//! and details. The server renders it as the `{error: {code, message, details}}`
//! envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx answer from the remote backend
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<Value>,
    },

    /// The response was abandoned because a newer write superseded it
    #[error("Request cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status associated with the error, when there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::NotFound(_) => Some(404),
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Csv(_) => Some(400),
            AppError::Conflict(_) => Some(409),
            AppError::BusinessRule(_) => Some(422),
            AppError::Timeout => Some(408),
            AppError::Api { status, .. } => Some(*status),
            AppError::Storage(_) | AppError::Internal(_) => Some(500),
            AppError::Network(_) | AppError::Cancelled => None,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BusinessRule(_) => "BUSINESS_RULE",
            AppError::Timeout => "TIMEOUT",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Api { code, .. } => code.as_deref().unwrap_or("HTTP_ERROR"),
            AppError::Cancelled => "CANCELLED",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            AppError::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// True for local not-found errors and remote 404 answers alike.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
            || matches!(self, AppError::Api { status: 404, .. })
    }

    /// Message shown to the user (no variant prefix for remote errors).
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::BusinessRule(msg)
            | AppError::Network(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Error envelope body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Cancelled => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            other => other
                .status_code()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };

        let message = match &self {
            AppError::Storage(msg) | AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.user_message(),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                details: self.details().cloned(),
            },
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else if err.is_decode() {
            AppError::Internal(format!("Invalid response body: {}", err))
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Csv(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        assert_eq!(AppError::Timeout.code(), "TIMEOUT");
        assert_eq!(AppError::Timeout.status_code(), Some(408));
        assert_eq!(AppError::Network("refused".into()).code(), "NETWORK_ERROR");
        assert_eq!(AppError::Network("refused".into()).status_code(), None);
        assert_eq!(AppError::NotFound("x".into()).status_code(), Some(404));
    }

    #[test]
    fn test_remote_error_keeps_code_and_details() {
        let err = AppError::Api {
            status: 422,
            code: Some("INVALID_PAYLOAD".into()),
            message: "serviceTag is required".into(),
            details: Some(serde_json::json!({"field": "serviceTag"})),
        };
        assert_eq!(err.code(), "INVALID_PAYLOAD");
        assert_eq!(err.status_code(), Some(422));
        assert_eq!(err.to_string(), "serviceTag is required");
        assert_eq!(err.details().unwrap()["field"], "serviceTag");
    }

    #[test]
    fn test_remote_404_counts_as_not_found() {
        let err = AppError::Api {
            status: 404,
            code: None,
            message: "HTTP 404: Not Found".into(),
            details: None,
        };
        assert!(err.is_not_found());
        assert_eq!(err.code(), "HTTP_ERROR");
    }
}
