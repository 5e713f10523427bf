//! Stage entity model.

use onramp_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `stages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stage {
    pub id: DbId,
    pub flow_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A `(stage_id, content_block_id)` pair, used to build progress inputs for a
/// whole flow in one query.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct StageBlockId {
    pub stage_id: DbId,
    pub content_block_id: DbId,
}
