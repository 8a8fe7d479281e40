use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// Import Axum types for HTTP response conversion
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: HashMap<String, String> },
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrors::Single { field, message } => write!(f, "{}: {}", field, message),
            ValidationErrors::Multiple { fields } => {
                let mut entries: Vec<_> = fields.iter().collect();
                entries.sort();
                let joined = entries
                    .into_iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", joined)
            }
        }
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A validation error with field-level details.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// A malformed or inconsistent request (missing field, cross-board reference).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A not found error (resource does not exist).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A forbidden error (user lacks membership or role).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// A conflict error (duplicate invitation, already a member, already responded).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Shorthand for a single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::Single {
            field: field.into(),
            message: message.into(),
        })
    }

    /// Stable machine-readable code, also used as the `code` field of HTTP bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::BadRequest(_) => "BAD_REQUEST",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::Conflict(_) => "CONFLICT",
            Error::Sqlx(_) | Error::Migrate(_) | Error::Internal(_) => "INTERNAL_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status this error is surfaced as.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Sqlx(_) | Error::Migrate(_) | Error::Internal(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert custom Error to HTTP response
///
/// Each variant maps to an HTTP status code and a JSON body carrying an
/// error message and error code. Database and configuration details are
/// never leaked to the client.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            Error::Validation(errors) => match errors {
                ValidationErrors::Single { field, message } => {
                    serde_json::json!({
                        "error": "Validation failed",
                        "code": code,
                        "fields": {
                            field: message
                        }
                    })
                }
                ValidationErrors::Multiple { fields } => {
                    serde_json::json!({
                        "error": "Validation failed",
                        "code": code,
                        "fields": fields
                    })
                }
            },
            Error::BadRequest(msg)
            | Error::NotFound(msg)
            | Error::Forbidden(msg)
            | Error::Conflict(msg)
            | Error::Internal(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": code
                })
            }
            Error::Sqlx(_) | Error::Migrate(_) => {
                serde_json::json!({
                    "error": "Database error",
                    "code": code
                })
            }
            Error::Config(_) => {
                serde_json::json!({
                    "error": "Configuration error",
                    "code": code
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(Error::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::validation("title", "required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_uses_error_status() {
        let response = Error::Forbidden("not a member of this workspace".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = Error::Conflict("already responded".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation("color", "must be #RRGGBB");
        assert_eq!(err.to_string(), "Validation error: color: must be #RRGGBB");
    }
}
