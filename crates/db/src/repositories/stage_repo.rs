//! Repository for the `stages` table.
//!
//! Stage CRUD belongs to flow administration; the onboarding engine only
//! reads stages.

use onramp_core::types::DbId;
use sqlx::PgPool;

use crate::models::stage::{Stage, StageBlockId};

/// Column list for `stages` queries.
const COLUMNS: &str = "id, flow_id, name, description, order_index, created_at, updated_at";

/// Provides read access to stages.
pub struct StageRepo;

impl StageRepo {
    /// Find a stage by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Stage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stages WHERE id = $1");
        sqlx::query_as::<_, Stage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a stage only if it belongs to the given flow.
    pub async fn find_in_flow(
        pool: &PgPool,
        flow_id: DbId,
        id: DbId,
    ) -> Result<Option<Stage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stages WHERE id = $1 AND flow_id = $2");
        sqlx::query_as::<_, Stage>(&query)
            .bind(id)
            .bind(flow_id)
            .fetch_optional(pool)
            .await
    }

    /// List the stages of a flow in order.
    pub async fn list_by_flow(pool: &PgPool, flow_id: DbId) -> Result<Vec<Stage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stages \
             WHERE flow_id = $1 \
             ORDER BY order_index, id"
        );
        sqlx::query_as::<_, Stage>(&query)
            .bind(flow_id)
            .fetch_all(pool)
            .await
    }

    /// Every `(stage, block)` pair in a flow.
    pub async fn list_block_ids_by_flow(
        pool: &PgPool,
        flow_id: DbId,
    ) -> Result<Vec<StageBlockId>, sqlx::Error> {
        sqlx::query_as::<_, StageBlockId>(
            "SELECT b.stage_id, b.id AS content_block_id \
             FROM content_blocks b \
             JOIN stages s ON s.id = b.stage_id \
             WHERE s.flow_id = $1",
        )
        .bind(flow_id)
        .fetch_all(pool)
        .await
    }
}
