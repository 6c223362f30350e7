//! Error types for the toxtrack service
//!
//! Provides:
//! - Distinct error types for the workflow failure modes
//!   (validation, not-found, missing-field)
//! - HTTP status code mapping
//! - Structured JSON error responses with machine-readable codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,

    // Resource errors (4xxx)
    NotFound,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::NotFound => 4001,
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// A submitted value failed a step's validation rules. `details`
    /// optionally carries the context the client needs to re-show the
    /// step (e.g. the animal model's existing dose groups).
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        details: Option<serde_json::Value>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Shorthand for a field-level validation failure
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: Some(field.into()),
            details: None,
        }
    }

    /// Validation failure carrying extra context for the client
    pub fn validation_with_details(
        message: impl Into<String>,
        field: Option<String>,
        details: serde_json::Value,
    ) -> Self {
        AppError::Validation {
            message: message.into(),
            field,
            details: Some(details),
        }
    }

    /// Not-found failure for a typed entity
    pub fn not_found(resource_type: impl Into<String>, id: impl ToString) -> Self {
        AppError::NotFound {
            resource_type: resource_type.into(),
            id: id.to_string(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::MissingField { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Configuration {
            message: e.to_string(),
        }
    }
}

/// Structured error response for the API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let (field, details) = match self {
            AppError::Validation { field, details, .. } => (field, details),
            AppError::MissingField { field } => (Some(field), None),
            _ => (None, None),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::validation("dose_value must be a non-negative number", "dose_value");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(!err.is_server_error());
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::not_found("study", 42);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.code().as_code(), 4001);
    }

    #[test]
    fn error_codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::MissingField).unwrap();
        assert_eq!(json, "\"MISSING_FIELD\"");
    }

    #[test]
    fn validation_details_survive_into_the_response_body() {
        let err = AppError::validation_with_details(
            "Group size must be a positive integer",
            Some("group_size".to_string()),
            serde_json::json!({ "existing_dose_groups": [] }),
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let AppError::Validation { field, details, .. } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(field.as_deref(), Some("group_size"));
        assert_eq!(
            details.unwrap(),
            serde_json::json!({ "existing_dose_groups": [] })
        );
    }
}
