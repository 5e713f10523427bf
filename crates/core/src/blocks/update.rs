//! Planning of partial (PATCH) updates to a content block.
//!
//! The whole update is computed and validated in memory. Nothing here
//! touches storage: the caller holds the row lock, calls
//! [`apply_partial_update`], and writes the returned draft only on `Ok`.

use serde_json::Value;

use super::completeness::check_content;
use super::merge::deep_merge;
use super::BlockKind;
use crate::error::CoreError;
use crate::types::JsonMap;

/// The mutable payload of a persisted block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDraft {
    pub kind: BlockKind,
    pub config: Value,
    pub content: Value,
}

/// A partial update as received from an admin.
#[derive(Debug, Clone, Default)]
pub struct BlockPatch {
    /// May be repeated, but must match the persisted kind.
    pub block_type: Option<String>,
    pub config: Option<Value>,
    pub content: Option<Value>,
    pub order_index: Option<i32>,
}

/// Outcome of a successful plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    pub draft: BlockDraft,
    pub order_index: Option<i32>,
    /// `true` when `config` or `content` was patched.
    pub payload_changed: bool,
}

fn as_map<'a>(value: &'a Value, empty: &'a JsonMap) -> &'a JsonMap {
    value.as_object().unwrap_or(empty)
}

fn merge_side(
    current: &Value,
    patch: Option<&Value>,
    side: &str,
    errors: &mut Vec<String>,
) -> Value {
    let empty = JsonMap::new();
    match patch {
        None => current.clone(),
        Some(Value::Object(updates)) => Value::Object(deep_merge(as_map(current, &empty), updates)),
        Some(_) => {
            errors.push(format!("{side} update must be an object"));
            current.clone()
        }
    }
}

/// Merge `patch` into `current` and re-run the completeness check on the
/// merged pair. Any failure rejects the whole update.
pub fn apply_partial_update(
    current: &BlockDraft,
    patch: &BlockPatch,
) -> Result<PlannedUpdate, CoreError> {
    if let Some(tag) = patch.block_type.as_deref() {
        if tag != current.kind.as_str() {
            return Err(CoreError::Validation(format!(
                "Content block type cannot be changed from '{}' to '{tag}'",
                current.kind
            )));
        }
    }
    if matches!(patch.order_index, Some(i) if i < 0) {
        return Err(CoreError::Validation(
            "order_index must be a non-negative integer".to_string(),
        ));
    }

    let payload_changed = patch.config.is_some() || patch.content.is_some();
    if !payload_changed {
        return Ok(PlannedUpdate {
            draft: current.clone(),
            order_index: patch.order_index,
            payload_changed,
        });
    }

    let mut errors = Vec::new();
    let config = merge_side(&current.config, patch.config.as_ref(), "config", &mut errors);
    let content = merge_side(&current.content, patch.content.as_ref(), "content", &mut errors);
    if errors.is_empty() {
        errors = check_content(current.kind, &content);
    }
    if !errors.is_empty() {
        return Err(CoreError::MergeValidation(errors));
    }

    Ok(PlannedUpdate {
        draft: BlockDraft {
            kind: current.kind,
            config,
            content,
        },
        order_index: patch.order_index,
        payload_changed,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::blocks::catalog;

    fn single_choice() -> BlockDraft {
        let d = catalog::descriptor(BlockKind::SingleChoice);
        BlockDraft {
            kind: BlockKind::SingleChoice,
            config: d.default_config.clone(),
            content: d.default_content.clone(),
        }
    }

    #[test]
    fn merges_config_and_content_together() {
        let current = single_choice();
        let patch = BlockPatch {
            config: Some(json!({"question": {"allow_other": true}})),
            content: Some(json!({"question": "Where will you sit?"})),
            ..Default::default()
        };
        let planned = apply_partial_update(&current, &patch).unwrap();
        assert!(planned.payload_changed);
        assert_eq!(planned.draft.config["question"]["allow_other"], json!(true));
        assert_eq!(planned.draft.config["question"]["randomize_options"], json!(false));
        assert_eq!(planned.draft.content["question"], json!("Where will you sit?"));
        assert_eq!(planned.draft.content["options"], current.content["options"]);
    }

    #[test]
    fn invalid_merge_rejects_everything() {
        let current = single_choice();
        let before = current.clone();
        let patch = BlockPatch {
            config: Some(json!({"label": "Renamed"})),
            content: Some(json!({"options": [{"id": "only"}]})),
            ..Default::default()
        };
        assert_matches!(
            apply_partial_update(&current, &patch),
            Err(CoreError::MergeValidation(errors))
                if errors == vec!["Single choice must have at least 2 options".to_string()]
        );
        assert_eq!(current, before);
    }

    #[test]
    fn type_may_be_repeated_but_not_changed() {
        let current = single_choice();
        let same = BlockPatch {
            block_type: Some("single_choice".into()),
            ..Default::default()
        };
        assert!(apply_partial_update(&current, &same).is_ok());

        let other = BlockPatch {
            block_type: Some("multiple_choice".into()),
            ..Default::default()
        };
        assert_matches!(
            apply_partial_update(&current, &other),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn order_only_patch_skips_validation() {
        let mut current = single_choice();
        current.content = json!({});
        let patch = BlockPatch {
            order_index: Some(7),
            ..Default::default()
        };
        let planned = apply_partial_update(&current, &patch).unwrap();
        assert!(!planned.payload_changed);
        assert_eq!(planned.order_index, Some(7));
        assert_eq!(planned.draft, current);
    }

    #[test]
    fn non_object_patch_is_rejected() {
        let patch = BlockPatch {
            content: Some(json!(["not", "a", "map"])),
            ..Default::default()
        };
        assert_matches!(
            apply_partial_update(&single_choice(), &patch),
            Err(CoreError::MergeValidation(errors))
                if errors == vec!["content update must be an object".to_string()]
        );
    }
}
