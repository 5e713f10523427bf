use serde::Serialize;

use crate::session::LearnerStatus;
use crate::types::{DbId, Timestamp};

/// A schema violation located by its path inside the generic block shape,
/// e.g. `config.validation.rules.0.type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Onboarding session not found")]
    SessionNotFound,

    #[error("Missing required field 'type'")]
    MissingBlockType,

    #[error("Invalid content type: {0}")]
    UnknownBlockType(String),

    #[error("Content block does not match its schema ({} errors)", .0.len())]
    Schema(Vec<FieldError>),

    #[error("Merged content block is invalid: {}", .0.join("; "))]
    MergeValidation(Vec<String>),

    #[error("Validation failed: {}", .0.join("; "))]
    InputValidation(Vec<String>),

    #[error("Onboarding session has expired")]
    SessionExpired { expired_at: Option<Timestamp> },

    #[error("Onboarding access denied for status '{}'", .status.as_str())]
    AccessDenied { status: LearnerStatus },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
