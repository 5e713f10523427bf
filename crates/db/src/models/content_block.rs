//! Content block entity model and DTOs.

use onramp_core::blocks::update::{BlockDraft, BlockPatch};
use onramp_core::blocks::BlockKind;
use onramp_core::error::CoreError;
use onramp_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `content_blocks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentBlock {
    pub id: DbId,
    pub stage_id: DbId,
    #[serde(rename = "type")]
    pub block_type: String,
    pub config: Value,
    pub content: Value,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentBlock {
    /// The persisted payload as input to the update pipeline.
    ///
    /// A stored type outside the catalog means the row was written around
    /// the validator, so it is reported as an internal error.
    pub fn to_draft(&self) -> Result<BlockDraft, CoreError> {
        let kind = BlockKind::parse(&self.block_type).map_err(|_| {
            CoreError::Internal(format!(
                "Content block {} has unknown stored type '{}'",
                self.id, self.block_type
            ))
        })?;
        Ok(BlockDraft {
            kind,
            config: self.config.clone(),
            content: self.content.clone(),
        })
    }
}

/// DTO for creating a content block. Shape checks happen in the core
/// validator, so every field is accepted loosely here.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentBlock {
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub content: Value,
    pub order_index: Option<Value>,
}

/// DTO for a partial update. `config` and `content` are deep-merged into the
/// stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentBlock {
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    pub config: Option<Value>,
    pub content: Option<Value>,
    pub order_index: Option<i32>,
}

impl From<UpdateContentBlock> for BlockPatch {
    fn from(input: UpdateContentBlock) -> Self {
        BlockPatch {
            block_type: input.block_type,
            config: input.config,
            content: input.content,
            order_index: input.order_index,
        }
    }
}

/// One entry of a reorder request.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ReorderItem {
    pub id: DbId,
    #[validate(range(min = 1))]
    pub order_index: i32,
}

/// DTO for reordering the blocks of one stage.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ReorderContentBlocks {
    #[validate(length(min = 1), nested)]
    pub content_blocks: Vec<ReorderItem>,
}

/// DTO for the dry-run validation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateContentBlock {
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub content: Value,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn row(block_type: &str) -> ContentBlock {
        ContentBlock {
            id: 7,
            stage_id: 1,
            block_type: block_type.to_string(),
            config: json!({"label": "Name"}),
            content: json!({"label": "Name"}),
            order_index: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn stored_row_converts_to_draft() {
        let draft = row("text_input").to_draft().unwrap();
        assert_eq!(draft.kind, BlockKind::TextInput);
        assert_eq!(draft.content["label"], json!("Name"));
    }

    #[test]
    fn unknown_stored_type_is_internal() {
        assert_matches!(row("banner").to_draft(), Err(CoreError::Internal(_)));
    }

    #[test]
    fn reorder_requires_items_and_positive_indices() {
        let empty: ReorderContentBlocks =
            serde_json::from_value(json!({"content_blocks": []})).unwrap();
        assert!(empty.validate().is_err());

        let zero: ReorderContentBlocks =
            serde_json::from_value(json!({"content_blocks": [{"id": 1, "order_index": 0}]}))
                .unwrap();
        let errors = zero.validate().unwrap_err();
        assert!(errors.errors().contains_key("content_blocks"));

        let ok: ReorderContentBlocks =
            serde_json::from_value(json!({"content_blocks": [{"id": 1, "order_index": 1}]}))
                .unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn serialized_row_uses_type_key() {
        let json = serde_json::to_value(row("header")).unwrap();
        assert_eq!(json["type"], json!("header"));
        assert!(json.get("block_type").is_none());
    }
}
