//! Deep merge for partial `config`/`content` updates.

use serde_json::Value;

use crate::types::JsonMap;

/// Merge `updates` into a copy of `original`.
///
/// Objects present on both sides are merged key by key; any other value in
/// `updates` (arrays included) replaces the original outright.
pub fn deep_merge(original: &JsonMap, updates: &JsonMap) -> JsonMap {
    let mut merged = original.clone();
    for (key, value) in updates {
        let next = match (merged.get(key), value) {
            (Some(Value::Object(base)), Value::Object(patch)) => {
                Value::Object(deep_merge(base, patch))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn obj(v: Value) -> JsonMap {
        match v {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn nested_objects_merge() {
        let a = obj(json!({"display": {"width": "full", "order": 1}, "label": "A"}));
        let b = obj(json!({"display": {"order": 3}}));
        assert_eq!(
            Value::Object(deep_merge(&a, &b)),
            json!({"display": {"width": "full", "order": 3}, "label": "A"})
        );
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let a = obj(json!({"options": [{"id": "a"}, {"id": "b"}]}));
        let b = obj(json!({"options": [{"id": "z"}]}));
        assert_eq!(
            Value::Object(deep_merge(&a, &b)),
            json!({"options": [{"id": "z"}]})
        );
    }

    #[test]
    fn scalar_over_object_and_object_over_scalar() {
        let a = obj(json!({"x": {"k": 1}, "y": 2}));
        let b = obj(json!({"x": null, "y": {"k": 2}}));
        assert_eq!(
            Value::Object(deep_merge(&a, &b)),
            json!({"x": null, "y": {"k": 2}})
        );
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let a = obj(json!({
            "label": "Q",
            "validation": {"rules": [{"type": "required"}], "messages": {"required": "x"}},
            "question": {"allow_other": false}
        }));
        let b = obj(json!({
            "validation": {"messages": {"min_options": "two please"}},
            "question": {"allow_other": true, "other_label": "Other"},
            "display": {"order": 9}
        }));
        let once = deep_merge(&a, &b);
        let twice = deep_merge(&once, &b);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_patch_is_identity() {
        let a = obj(json!({"a": {"b": [1, 2]}}));
        assert_eq!(deep_merge(&a, &JsonMap::new()), a);
    }
}
