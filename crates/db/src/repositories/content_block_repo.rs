//! Repository for the `content_blocks` table.

use onramp_core::blocks::schema::ValidatedBlock;
use onramp_core::types::DbId;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::content_block::{ContentBlock, ReorderItem};

/// Column list for `content_blocks` queries.
const COLUMNS: &str = "id, stage_id, block_type, config, content, order_index, \
     created_at, updated_at";

/// Column list qualified with the `b` alias, for joins against `stages`.
const JOINED_COLUMNS: &str = "b.id, b.stage_id, b.block_type, b.config, b.content, \
     b.order_index, b.created_at, b.updated_at";

/// Provides CRUD and ordering operations for content blocks.
pub struct ContentBlockRepo;

impl ContentBlockRepo {
    /// Insert a validated block into a stage.
    ///
    /// Runs in one transaction that locks the stage row, so two concurrent
    /// creates without an explicit `order_index` cannot both read the same
    /// maximum. Returns `None` if the stage does not exist.
    pub async fn create_in_stage(
        pool: &PgPool,
        stage_id: DbId,
        block: &ValidatedBlock,
    ) -> Result<Option<ContentBlock>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM stages WHERE id = $1 FOR UPDATE")
                .bind(stage_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let order_index = match block.order_index {
            Some(index) => index,
            None => Self::next_order_index_inner(&mut tx, stage_id).await?,
        };

        let query = format!(
            "INSERT INTO content_blocks (stage_id, block_type, config, content, order_index) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, ContentBlock>(&query)
            .bind(stage_id)
            .bind(block.kind.as_str())
            .bind(block.config_json())
            .bind(block.content_json())
            .bind(order_index)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(created))
    }

    /// `max(order_index) + 1` within the stage, `1` for an empty stage.
    async fn next_order_index_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        stage_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(order_index), 0) + 1 FROM content_blocks WHERE stage_id = $1",
        )
        .bind(stage_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(next)
    }

    /// Find a content block by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ContentBlock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_blocks WHERE id = $1");
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the blocks of a stage in display order.
    pub async fn list_by_stage(
        pool: &PgPool,
        stage_id: DbId,
    ) -> Result<Vec<ContentBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_blocks \
             WHERE stage_id = $1 \
             ORDER BY order_index, id"
        );
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(stage_id)
            .fetch_all(pool)
            .await
    }

    /// List every block of a flow, ordered by stage and then by block.
    pub async fn list_by_flow(
        pool: &PgPool,
        flow_id: DbId,
    ) -> Result<Vec<ContentBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM content_blocks b \
             JOIN stages s ON s.id = b.stage_id \
             WHERE s.flow_id = $1 \
             ORDER BY s.order_index, s.id, b.order_index, b.id"
        );
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(flow_id)
            .fetch_all(pool)
            .await
    }

    /// Load a block and hold its row lock until `tx` ends.
    pub async fn lock_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<ContentBlock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_blocks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write a merged payload inside the transaction that locked the row.
    /// A `None` order index leaves the current one in place.
    pub async fn update_payload(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        config: &Value,
        content: &Value,
        order_index: Option<i32>,
    ) -> Result<ContentBlock, sqlx::Error> {
        let query = format!(
            "UPDATE content_blocks SET \
                config = $2, \
                content = $3, \
                order_index = COALESCE($4, order_index), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(id)
            .bind(config)
            .bind(content)
            .bind(order_index)
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a content block. Completion records cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content_blocks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply new order indices in one transaction and return the stage's
    /// blocks in their new order. Items naming a block outside the stage are
    /// skipped.
    pub async fn reorder(
        pool: &PgPool,
        stage_id: DbId,
        items: &[ReorderItem],
    ) -> Result<Vec<ContentBlock>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for item in items {
            sqlx::query(
                "UPDATE content_blocks SET order_index = $3, updated_at = NOW() \
                 WHERE id = $1 AND stage_id = $2",
            )
            .bind(item.id)
            .bind(stage_id)
            .bind(item.order_index)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Self::list_by_stage(pool, stage_id).await
    }
}
