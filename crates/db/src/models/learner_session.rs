//! Learner session entity model and DTOs.

use onramp_core::error::CoreError;
use onramp_core::session::{LearnerStatus, SessionState};
use onramp_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `learner_sessions` table.
///
/// The bearer token itself is never stored, only its SHA-256 digest.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LearnerSession {
    pub id: DbId,
    pub flow_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub session_token_hash: String,
    pub session_token_expires_at: Option<Timestamp>,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LearnerSession {
    /// The lifecycle fields as seen by the session gate.
    pub fn state(&self) -> Result<SessionState, CoreError> {
        Ok(SessionState {
            status: LearnerStatus::from_db(&self.status)?,
            expires_at: self.session_token_expires_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// DTO for enrolling a learner into a flow.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLearnerSession {
    pub flow_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn session(status: &str) -> LearnerSession {
        LearnerSession {
            id: 1,
            flow_id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            session_token_hash: "ab".repeat(32),
            session_token_expires_at: None,
            status: status.to_string(),
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn state_reads_the_status_column() {
        let state = session("started").state().unwrap();
        assert_eq!(state.status, LearnerStatus::Started);
        assert_eq!(state.expires_at, None);
        assert_eq!(session("started").full_name(), "Ada Lovelace");
    }

    #[test]
    fn unknown_status_is_an_error() {
        assert_matches!(session("archived").state(), Err(CoreError::Internal(_)));
    }

    #[test]
    fn token_hash_is_never_serialized() {
        let json = serde_json::to_value(session("pending")).unwrap();
        assert!(json.get("session_token_hash").is_none());
        assert_eq!(json["status"], "pending");
    }
}
