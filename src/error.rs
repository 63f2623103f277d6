//! Custom error types and handling
//!
//! This module defines the application's error types and implements
//! conversion to the JSON envelope returned by every endpoint.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Field name to list of human-readable messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("The given data was invalid")]
    Validation(FieldErrors),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Registration rules
    #[error("User is already registered for this event")]
    DuplicateRegistration,

    #[error("Event has reached maximum participants")]
    CapacityExceeded,

    #[error("Cannot register for an event that has already started")]
    EventAlreadyStarted,

    #[error("Cannot cancel registration less than 1 hour before the event")]
    TooLateToCancel,

    // Rate limiting
    #[error("Too many requests")]
    TooManyRequests,

    // Storage errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Redis error: {0}")]
    Redis(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error body, shaped like every other envelope with `success = false`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl AppError {
    /// Single-field validation error
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::DuplicateRegistration => "DUPLICATE_REGISTRATION",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::EventAlreadyStarted => "EVENT_ALREADY_STARTED",
            Self::TooLateToCancel => "TOO_LATE_TO_CANCEL",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Database(_) | Self::Redis(_) | Self::Internal(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::DuplicateRegistration => StatusCode::CONFLICT,
            Self::Validation(_)
            | Self::CapacityExceeded
            | Self::EventAlreadyStarted
            | Self::TooLateToCancel => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Redis(_) | Self::Internal(_) | Self::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log internal errors but don't expose details to clients
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error");
                "An unexpected error occurred".to_string()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "An unexpected error occurred".to_string()
            }
            AppError::Redis(e) => {
                tracing::error!(error = %e, "Redis error");
                "An unexpected error occurred".to_string()
            }
            AppError::Configuration(e) => {
                tracing::error!(error = %e, "Configuration error");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let errors = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            error: code,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

// Implement From for common error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    AppError::Conflict("Resource already exists".to_string())
                } else if db_err.is_foreign_key_violation() {
                    let field = db_err
                        .constraint()
                        .and_then(foreign_key_field)
                        .unwrap_or("reference");
                    AppError::field(field, format!("The selected {field} is invalid"))
                } else {
                    AppError::Database(db_err.to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

/// Postgres names FK constraints `<table>_<column>_fkey`
fn foreign_key_field(constraint: &str) -> Option<&str> {
    let trimmed = constraint.strip_suffix("_fkey")?;
    let column_start = trimmed.rfind("_id")?;
    let head = &trimmed[..column_start];
    let start = head.rfind('_').map(|i| i + 1).unwrap_or(0);
    Some(&trimmed[start..column_start + 3])
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Redis(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    }
}

/// Flatten `validator` output into the field map used by the envelope
pub fn field_errors(err: &validator::ValidationErrors) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (field, field_errors) in err.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {field} field is invalid"))
            })
            .collect();
        errors.insert(field.to_string(), messages);
    }
    errors
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(field_errors(&err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => deserialize_error(&e.body_text(), "body"),
            JsonRejection::JsonSyntaxError(_) => {
                AppError::field("body", "The request body is not valid JSON")
            }
            JsonRejection::MissingJsonContentType(_) => {
                AppError::field("body", "Expected `Content-Type: application/json`")
            }
            other => AppError::field("body", other.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                AppError::field("path", e.body_text())
            }
            other => AppError::Internal(anyhow::anyhow!(other.body_text())),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        deserialize_error(&rejection.body_text(), "query")
    }
}

/// Field-level error from a serde message such as
/// "...: missing field `event_id`" or "...: event_id: invalid type: ..."
fn deserialize_error(text: &str, fallback: &str) -> AppError {
    let detail = text.split_once("target type: ").map(|(_, d)| d).unwrap_or(text);
    let detail = detail.strip_prefix("Failed to deserialize query string: ").unwrap_or(detail);

    if let Some(field) = detail
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(field, _)| field)
    {
        return AppError::field(field, format!("The {field} field is required"));
    }

    match detail.split_once(": ") {
        Some((path, message)) if is_field_path(path) => AppError::field(path, message),
        _ => AppError::field(fallback, detail),
    }
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateRegistration.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::CapacityExceeded.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::EventAlreadyStarted.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::TooLateToCancel.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::field("title", "required").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::TooManyRequests.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AppError::Configuration("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Database("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_business_rule_envelope() {
        let (status, body) = body_of(AppError::CapacityExceeded).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "CAPACITY_EXCEEDED");
        assert_eq!(body["message"], "Event has reached maximum participants");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_validation_envelope_carries_field_errors() {
        let (status, body) = body_of(AppError::field("status_id", "The selected status_id is invalid")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["status_id"][0], "The selected status_id is invalid");
    }

    #[tokio::test]
    async fn test_storage_errors_do_not_leak() {
        let (status, body) = body_of(AppError::Database("relation \"secret\" does not exist".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "UNEXPECTED_ERROR");
        assert_eq!(body["message"], "An unexpected error occurred");
    }

    #[tokio::test]
    async fn test_every_kind_has_stable_code() {
        let cases = vec![
            (AppError::DuplicateRegistration, "DUPLICATE_REGISTRATION"),
            (AppError::EventAlreadyStarted, "EVENT_ALREADY_STARTED"),
            (AppError::TooLateToCancel, "TOO_LATE_TO_CANCEL"),
            (AppError::NotFound("Event not found".into()), "NOT_FOUND"),
            (AppError::Configuration("missing".into()), "CONFIGURATION_ERROR"),
            (AppError::Forbidden("no".into()), "FORBIDDEN"),
            (AppError::InvalidCredentials, "INVALID_CREDENTIALS"),
            (AppError::TokenExpired, "TOKEN_EXPIRED"),
            (AppError::Internal(anyhow::anyhow!("boom")), "UNEXPECTED_ERROR"),
        ];
        for (err, code) in cases {
            assert_eq!(err.error_code(), code);
            let (_, body) = body_of(err).await;
            assert_eq!(body["error"], code);
        }
    }

    #[test]
    fn test_deserialize_error_names_the_field() {
        let missing = deserialize_error(
            "Failed to deserialize the JSON body into the target type: missing field `status_id` at line 1 column 2",
            "body",
        );
        match missing {
            AppError::Validation(errors) => {
                assert_eq!(errors["status_id"], vec!["The status_id field is required"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let wrong_type = deserialize_error(
            "Failed to deserialize query string: page: invalid digit found in string",
            "query",
        );
        match wrong_type {
            AppError::Validation(errors) => {
                assert_eq!(errors["page"], vec!["invalid digit found in string"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let unnamed = deserialize_error("invalid type: sequence, expected a map", "body");
        match unnamed {
            AppError::Validation(errors) => assert!(errors.contains_key("body")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_key_field() {
        assert_eq!(foreign_key_field("events_type_id_fkey"), Some("type_id"));
        assert_eq!(foreign_key_field("event_registrations_event_id_fkey"), Some("event_id"));
        assert_eq!(foreign_key_field("users_pkey"), None);
    }
}
