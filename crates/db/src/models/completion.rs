//! Completion record model and the block-with-progress view.

use onramp_core::progress::CompletionStatus;
use onramp_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use super::content_block::ContentBlock;

/// A row from the `completion_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompletionRecord {
    pub id: DbId,
    pub learner_session_id: DbId,
    pub stage_id: DbId,
    pub content_block_id: DbId,
    pub status: String,
    pub data: Option<Value>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CompletionRecord {
    pub fn completion_status(&self) -> CompletionStatus {
        CompletionStatus::from_db(&self.status)
    }
}

/// A content block as a learner sees it: the block merged with that
/// learner's completion record. Blocks without a record read as `pending`.
#[derive(Debug, Clone, Serialize)]
pub struct BlockWithProgress {
    pub id: DbId,
    #[serde(rename = "type")]
    pub block_type: String,
    pub config: Value,
    pub content: Value,
    pub order_index: i32,
    pub status: CompletionStatus,
    pub data: Option<Value>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl BlockWithProgress {
    pub fn new(block: ContentBlock, record: Option<&CompletionRecord>) -> Self {
        Self {
            id: block.id,
            block_type: block.block_type,
            config: block.config,
            content: block.content,
            order_index: block.order_index,
            status: record
                .map(CompletionRecord::completion_status)
                .unwrap_or_default(),
            data: record.and_then(|r| r.data.clone()),
            started_at: record.and_then(|r| r.started_at),
            completed_at: record.and_then(|r| r.completed_at),
        }
    }
}
