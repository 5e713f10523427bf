use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use onramp_core::error::CoreError;
use serde_json::{json, Value};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `onramp_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code, message and any extra body fields.
type ErrorParts = (StatusCode, &'static str, String, Option<(&'static str, Value)>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, extra) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Database(err) => {
                let (status, code, message) = classify_sqlx_error(err);
                (status, code, message, None)
            }

            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let (Some((key, value)), Some(map)) = (extra, body.as_object_mut()) {
            map.insert(key.to_string(), value);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> ErrorParts {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
            None,
        ),
        CoreError::SessionNotFound => (
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            core.to_string(),
            None,
        ),
        CoreError::MissingBlockType => (
            StatusCode::BAD_REQUEST,
            "MISSING_BLOCK_TYPE",
            core.to_string(),
            None,
        ),
        CoreError::UnknownBlockType(_) => (
            StatusCode::BAD_REQUEST,
            "UNKNOWN_BLOCK_TYPE",
            core.to_string(),
            None,
        ),
        CoreError::Schema(errors) => (
            StatusCode::BAD_REQUEST,
            "SCHEMA_ERROR",
            "Content block does not match its schema".to_string(),
            Some(("details", json!(errors))),
        ),
        CoreError::MergeValidation(errors) => (
            StatusCode::BAD_REQUEST,
            "MERGE_VALIDATION_ERROR",
            errors.join("; "),
            Some(("details", json!(errors))),
        ),
        CoreError::InputValidation(errors) => (
            StatusCode::BAD_REQUEST,
            "INPUT_VALIDATION_ERROR",
            "Validation failed".to_string(),
            Some(("details", json!(errors))),
        ),
        CoreError::SessionExpired { expired_at } => (
            StatusCode::UNAUTHORIZED,
            "SESSION_EXPIRED",
            "Your onboarding session has expired. Please request a new link.".to_string(),
            Some(("expired_at", json!(expired_at))),
        ),
        CoreError::AccessDenied { status } => (
            StatusCode::FORBIDDEN,
            "ACCESS_DENIED",
            "You cannot access onboarding at this time. Please contact your administrator."
                .to_string(),
            Some(("status", json!(status))),
        ),
        CoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            msg.clone(),
            Some(("details", json!([msg]))),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
        CoreError::Unauthorized(msg) => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
        }
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl From<onramp_core::storage::StorageError> for AppError {
    fn from(err: onramp_core::storage::StorageError) -> Self {
        match err {
            onramp_core::storage::StorageError::InvalidPath(path) => {
                AppError::BadRequest(format!("Invalid upload path: {path}"))
            }
            other => AppError::InternalError(format!("File upload failed: {other}")),
        }
    }
}
