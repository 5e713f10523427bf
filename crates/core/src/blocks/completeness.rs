//! Per-kind content completeness check.
//!
//! Lighter than the admin schema: it only asks whether the fields a learner
//! needs to see are present and non-blank. One message per missing field.

use serde_json::Value;

use super::catalog::{self, ContentRequirement};
use super::BlockKind;

/// Blank in the loose sense: absent, null, `false`, zero, or an empty
/// string/array/object.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// Element count used for the `min_items` thresholds. Scalars count as zero.
fn item_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(s) => s.chars().count(),
        _ => 0,
    }
}

fn check_requirement(req: &ContentRequirement, content: &Value, errors: &mut Vec<String>) {
    let value = content.get(req.field);
    if is_blank(value) {
        errors.push(req.missing_message.to_string());
        return;
    }
    if let (Some((min, message)), Some(value)) = (req.min_items, value) {
        if item_count(value) < min {
            errors.push(message.to_string());
        }
    }
}

/// Check `content` against the kind's required fields. An empty result means
/// the block is complete.
pub fn check_content(kind: BlockKind, content: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    for req in catalog::descriptor(kind).content_requirements {
        check_requirement(req, content, &mut errors);
    }
    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
