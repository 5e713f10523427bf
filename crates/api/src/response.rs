//! Shared response envelope types for API handlers.
//!
//! Admin responses use a `{ "data": ... }` envelope. Learner lifecycle
//! actions add a human-readable `message`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ..., "data": T }`, returned by learner actions.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub message: &'static str,
    pub data: T,
}
