//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use onramp_api::error::AppError;
use onramp_core::error::{CoreError, FieldError};
use onramp_core::session::LearnerStatus;
use onramp_core::storage::StorageError;
use serde_json::json;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "ContentBlock",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "ContentBlock with id 42 not found");
}

#[tokio::test]
async fn unknown_session_returns_404() {
    let (status, json) = error_to_response(CoreError::SessionNotFound.into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "SESSION_NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Block validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_and_unknown_types_have_their_own_codes() {
    let (status, json) = error_to_response(CoreError::MissingBlockType.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MISSING_BLOCK_TYPE");

    let (status, json) =
        error_to_response(CoreError::UnknownBlockType("banner".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "UNKNOWN_BLOCK_TYPE");
    assert_eq!(json["error"], "Invalid content type: banner");
}

#[tokio::test]
async fn schema_errors_carry_field_paths() {
    let err = CoreError::Schema(vec![FieldError {
        path: "config.label".into(),
        message: "Expected string".into(),
    }]);

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "SCHEMA_ERROR");
    assert_eq!(
        json["details"],
        json!([{"path": "config.label", "message": "Expected string"}])
    );
}

#[tokio::test]
async fn merge_and_input_failures_list_every_message() {
    let err = CoreError::MergeValidation(vec!["Header must have a title".into()]);
    let (status, json) = error_to_response(err.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MERGE_VALIDATION_ERROR");
    assert_eq!(json["details"], json!(["Header must have a title"]));

    let err = CoreError::InputValidation(vec![
        "value is required".into(),
        "value must be at least 2 characters".into(),
    ]);
    let (status, json) = error_to_response(err.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INPUT_VALIDATION_ERROR");
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(json["details"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Session gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_session_returns_401_with_expiry() {
    let expired_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let err = CoreError::SessionExpired {
        expired_at: Some(expired_at),
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "SESSION_EXPIRED");
    assert_eq!(json["expired_at"], json!(expired_at));
}

#[tokio::test]
async fn denied_session_returns_403_with_status() {
    let err = CoreError::AccessDenied {
        status: LearnerStatus::Completed,
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "ACCESS_DENIED");
    assert_eq!(json["status"], "completed");
}

// ---------------------------------------------------------------------------
// Generic variants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("Token is not expired".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Token is not expired");
}

#[tokio::test]
async fn validation_error_wraps_message_in_details() {
    let err = CoreError::Validation("Stage is not complete.".into());

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"], json!(["Stage is not complete."]));
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn storage_errors_split_client_and_server_faults() {
    let (status, _) =
        error_to_response(StorageError::InvalidPath("../x".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let (status, json) = error_to_response(StorageError::Io(io).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
