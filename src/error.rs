//! Error types for the studio booking server

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// One or more field-level violations, reported together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an error carrying exactly one violation
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self::new().add(field, message)
    }

    pub fn add(mut self, field: &str, message: impl Into<String>) -> Self {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether any violation targets `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "validation error");
        }
        write!(f, "validation error: ")?;
        for (i, fe) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", fe.field, fe.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Validation error response body
#[derive(Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    /// Always `validation_error`
    pub code: String,
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Validation(verr) => {
                tracing::info!("Validation error: {}", verr);
                let body = Json(ValidationErrorResponse {
                    code: "validation_error".to_string(),
                    message: "Validation failed".to_string(),
                    fields: verr.fields,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Conflict(msg) => {
                tracing::info!("Time conflict: {}", msg);
                (
                    StatusCode::CONFLICT,
                    "time_taken",
                    "The slot is already taken, please choose another time".to_string(),
                )
            }
            AppError::NotFound(msg) => {
                tracing::info!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "not_found", "Booking not found".to_string())
            }
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, "admin_unauthorized", msg)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field() {
        let err = ValidationError::new()
            .add("name", "Name is required")
            .add("phone", "Bad phone");

        assert_eq!(
            err.to_string(),
            "validation error: name: Name is required; phone: Bad phone"
        );
        assert!(err.has_field("phone"));
        assert!(!err.has_field("date"));
    }

    #[test]
    fn error_kinds_map_to_status_codes() {
        let cases = [
            (AppError::from(ValidationError::single("date", "x")), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT),
            (AppError::NotFound("missing".into()), StatusCode::NOT_FOUND),
            (AppError::Authentication("no".into()), StatusCode::UNAUTHORIZED),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
