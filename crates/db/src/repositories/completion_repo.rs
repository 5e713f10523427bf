//! Repository for the `completion_records` table.

use onramp_core::progress::CompletionStatus;
use onramp_core::types::DbId;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::completion::CompletionRecord;

/// Column list for `completion_records` queries.
const COLUMNS: &str = "id, learner_session_id, stage_id, content_block_id, status, data, \
     started_at, completed_at, created_at, updated_at";

/// Provides persistence for per-block completion records.
pub struct CompletionRepo;

impl CompletionRepo {
    /// Record a validated submission as completed.
    ///
    /// The first submission inserts the row with `started_at` set; later ones
    /// overwrite `data` and `completed_at` and keep the original `started_at`.
    pub async fn upsert_completed(
        pool: &PgPool,
        learner_session_id: DbId,
        stage_id: DbId,
        content_block_id: DbId,
        data: &Value,
    ) -> Result<CompletionRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO completion_records \
                (learner_session_id, stage_id, content_block_id, status, data, \
                 started_at, completed_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             ON CONFLICT (learner_session_id, content_block_id) DO UPDATE SET \
                status = EXCLUDED.status, \
                data = EXCLUDED.data, \
                completed_at = NOW(), \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompletionRecord>(&query)
            .bind(learner_session_id)
            .bind(stage_id)
            .bind(content_block_id)
            .bind(CompletionStatus::Completed.as_str())
            .bind(data)
            .fetch_one(pool)
            .await
    }

    /// All records for one learner.
    pub async fn list_for_session(
        pool: &PgPool,
        learner_session_id: DbId,
    ) -> Result<Vec<CompletionRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM completion_records \
             WHERE learner_session_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, CompletionRecord>(&query)
            .bind(learner_session_id)
            .fetch_all(pool)
            .await
    }
}
