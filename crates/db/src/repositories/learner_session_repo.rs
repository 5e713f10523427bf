//! Repository for the `learner_sessions` table.

use onramp_core::session::SessionState;
use onramp_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::learner_session::{CreateLearnerSession, LearnerSession};

/// Column list for `learner_sessions` queries.
const COLUMNS: &str = "id, flow_id, first_name, last_name, email, session_token_hash, \
     session_token_expires_at, status, started_at, completed_at, created_at, updated_at";

/// Provides lookup and lifecycle updates for learner sessions.
pub struct LearnerSessionRepo;

impl LearnerSessionRepo {
    /// Enroll a learner. The caller issues the token and passes its digest.
    pub async fn create(
        pool: &PgPool,
        input: &CreateLearnerSession,
        token_hash: &str,
        expires_at: Option<Timestamp>,
    ) -> Result<LearnerSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO learner_sessions \
                (flow_id, first_name, last_name, email, \
                 session_token_hash, session_token_expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LearnerSession>(&query)
            .bind(input.flow_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by the digest of its bearer token.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<LearnerSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM learner_sessions WHERE session_token_hash = $1");
        sqlx::query_as::<_, LearnerSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Lock a session row for a read-plan-write lifecycle transition.
    /// Concurrent transitions on the same learner queue behind the lock.
    pub async fn lock_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<LearnerSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM learner_sessions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, LearnerSession>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Persist a lifecycle transition computed by the session gate, inside
    /// the transaction that locked the row.
    pub async fn update_lifecycle(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        state: &SessionState,
    ) -> Result<LearnerSession, sqlx::Error> {
        let query = format!(
            "UPDATE learner_sessions SET \
                status = $2, \
                started_at = $3, \
                completed_at = $4, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LearnerSession>(&query)
            .bind(id)
            .bind(state.status.as_str())
            .bind(state.started_at)
            .bind(state.completed_at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Swap in a new token, but only if the stored digest is still
    /// `old_hash`. Returns `None` when another renewal got there first.
    pub async fn renew_token(
        pool: &PgPool,
        id: DbId,
        old_hash: &str,
        new_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Option<LearnerSession>, sqlx::Error> {
        let query = format!(
            "UPDATE learner_sessions SET \
                session_token_hash = $3, \
                session_token_expires_at = $4, \
                updated_at = NOW() \
             WHERE id = $1 AND session_token_hash = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LearnerSession>(&query)
            .bind(id)
            .bind(old_hash)
            .bind(new_hash)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }
}
