//! Learner session gate: token expiry, access, lifecycle and renewal.
//!
//! Session tokens are bearer credentials. Only their SHA-256 digest is
//! stored; the plaintext is handed to the learner once and then forgotten.
//!
//! Status lifecycle: `pending -> started -> completed`. Expiry is orthogonal
//! and derived from `expires_at` (no expiry means the token never expires).

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::progress::ProgressSnapshot;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated session token (alphanumeric characters).
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// Default validity window of a renewed token, in days.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerStatus {
    Pending,
    Started,
    Completed,
    Expired,
}

impl LearnerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    pub fn from_db(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(Self::Pending),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "expired" => Ok(Self::Expired),
            other => Err(CoreError::Internal(format!(
                "Unknown learner status '{other}'"
            ))),
        }
    }

    /// Only pending and started learners may use the flow.
    pub fn can_access(self) -> bool {
        matches!(self, Self::Pending | Self::Started)
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The gate-relevant fields of a learner session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub status: LearnerStatus,
    pub expires_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl SessionState {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        is_token_expired(self.expires_at, now)
    }
}

/// `now` strictly after the expiry. `None` never expires.
pub fn is_token_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    expires_at.is_some_and(|at| now > at)
}

/// Expiry half of [`check_access`], for lifecycle actions that judge the
/// status themselves.
pub fn check_not_expired(state: &SessionState, now: Timestamp) -> Result<(), CoreError> {
    if state.is_expired(now) {
        return Err(CoreError::SessionExpired {
            expired_at: state.expires_at,
        });
    }
    Ok(())
}

/// Gate a request. Expiry is checked before status so an expired learner is
/// offered renewal rather than a plain denial.
pub fn check_access(state: &SessionState, now: Timestamp) -> Result<(), CoreError> {
    check_not_expired(state, now)?;
    if !state.status.can_access() {
        return Err(CoreError::AccessDenied {
            status: state.status,
        });
    }
    Ok(())
}

/// Body of the validate-session endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<Timestamp>,
    pub status: LearnerStatus,
    pub expires_at: Option<Timestamp>,
}

/// Non-failing variant of [`check_access`] for callers that report rather
/// than reject.
pub fn describe_access(state: &SessionState, now: Timestamp) -> AccessReport {
    let (valid, error, expired_at) = match check_access(state, now) {
        Ok(()) => (true, None, None),
        Err(CoreError::SessionExpired { expired_at }) => {
            (false, Some("session_token_expired"), expired_at)
        }
        Err(_) => (false, Some("access_denied"), None),
    };
    AccessReport {
        valid,
        error,
        expired_at,
        status: state.status,
        expires_at: state.expires_at,
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Status half of the gate for lifecycle transitions. A completed learner is
/// a conflict; any other status outside pending/started is denied.
fn check_can_transition(state: &SessionState) -> Result<(), CoreError> {
    match state.status {
        LearnerStatus::Completed => Err(CoreError::Conflict(
            "Onboarding already completed".to_string(),
        )),
        status if !status.can_access() => Err(CoreError::AccessDenied { status }),
        _ => Ok(()),
    }
}

/// `pending -> started`. Re-starting a started session keeps its original
/// `started_at`.
pub fn start(state: &SessionState, now: Timestamp) -> Result<SessionState, CoreError> {
    check_can_transition(state)?;
    Ok(SessionState {
        status: LearnerStatus::Started,
        started_at: state.started_at.or(Some(now)),
        ..state.clone()
    })
}

/// `-> completed`, allowed only once every stage is complete.
pub fn complete(
    state: &SessionState,
    progress: &ProgressSnapshot,
    now: Timestamp,
) -> Result<SessionState, CoreError> {
    check_can_transition(state)?;
    if !progress.all_complete() {
        return Err(CoreError::Validation(
            "Cannot complete onboarding. All stages must be finished.".to_string(),
        ));
    }
    Ok(SessionState {
        status: LearnerStatus::Completed,
        started_at: state.started_at.or(Some(now)),
        completed_at: state.completed_at.or(Some(now)),
        ..state.clone()
    })
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// A freshly issued token. `token` is returned to the learner once; only
/// `token_hash` is persisted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_hash: String,
    pub expires_at: Timestamp,
}

pub fn generate_session_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Digest used to look a session up by its presented token.
pub fn hash_session_token(token: &str) -> String {
    crate::hashing::sha256_hex(token.as_bytes())
}

/// Issue a token valid for `ttl` from `now`.
pub fn issue_token(now: Timestamp, ttl: Duration) -> IssuedToken {
    let token = generate_session_token();
    let token_hash = hash_session_token(&token);
    IssuedToken {
        token,
        token_hash,
        expires_at: now + ttl,
    }
}

/// Renewal is only allowed once the current token has expired.
pub fn plan_renewal(
    state: &SessionState,
    now: Timestamp,
    ttl: Duration,
) -> Result<IssuedToken, CoreError> {
    if !state.is_expired(now) {
        return Err(CoreError::Conflict("Token is not expired".to_string()));
    }
    Ok(issue_token(now, ttl))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
