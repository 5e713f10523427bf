//! Admin-time shape validation of a `{type, config, content, order_index}`
//! payload.
//!
//! Dispatch happens on the type tag. The per-kind check reports paths rooted
//! at the tag (`date.config.date`), the same way a tagged union would, and
//! [`rebase`] strips that leading segment so callers see paths relative to
//! the generic block shape (`config.date`). All problems are collected before
//! returning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{self, BlockDescriptor};
use super::completeness::check_content;
use super::rules::{RuleKind, ValidationRule};
use super::BlockKind;
use crate::error::{CoreError, FieldError};
use crate::types::JsonMap;

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

/// `config.validation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub rules: Vec<ValidationRule>,
    pub messages: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// The known fields of a block `config`. The type-specific section and any
/// admin-added metadata stay in `extra` and are persisted untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub label: String,
    pub description: Option<String>,
    pub required: bool,
    pub validation: ValidationConfig,
    pub display: JsonMap,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl BlockConfig {
    /// The type-specific section, e.g. `config.question`.
    pub fn section(&self, kind: BlockKind) -> Option<&JsonMap> {
        self.extra
            .get(catalog::descriptor(kind).config_section)
            .and_then(Value::as_object)
    }
}

/// A payload that passed [`validate_admin_block`].
#[derive(Debug, Clone)]
pub struct ValidatedBlock {
    pub kind: BlockKind,
    pub config: BlockConfig,
    pub content: JsonMap,
    pub order_index: Option<i32>,
}

impl ValidatedBlock {
    /// `config` as stored, with `required` filled in.
    pub fn config_json(&self) -> Value {
        serde_json::to_value(&self.config).unwrap_or(Value::Null)
    }

    pub fn content_json(&self) -> Value {
        Value::Object(self.content.clone())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate an admin-authored block.
///
/// A missing or unrecognised `type` is reported as its own error kind, never
/// folded into the shape errors.
pub fn validate_admin_block(
    block_type: Option<&str>,
    config: &Value,
    content: &Value,
    order_index: Option<&Value>,
) -> Result<ValidatedBlock, CoreError> {
    let tag = block_type.ok_or(CoreError::MissingBlockType)?;
    let descriptor = catalog::lookup(tag)?;

    let mut errors = Vec::new();
    check_variant(descriptor, config, content, order_index, &mut errors);
    if !errors.is_empty() {
        return Err(CoreError::Schema(rebase(errors, tag)));
    }

    // Shape is known good from here on.
    let config = typed_config(descriptor, config)?;
    let content = content.as_object().cloned().unwrap_or_default();
    let order_index = order_index
        .and_then(Value::as_i64)
        .and_then(|i| i32::try_from(i).ok());

    Ok(ValidatedBlock {
        kind: descriptor.kind,
        config,
        content,
        order_index,
    })
}

/// Shape validation followed by the content completeness check, as run when
/// a block is first created. Completeness failures are reported against
/// `content`.
pub fn validate_new_block(
    block_type: Option<&str>,
    config: &Value,
    content: &Value,
    order_index: Option<&Value>,
) -> Result<ValidatedBlock, CoreError> {
    let block = validate_admin_block(block_type, config, content, order_index)?;
    let missing = check_content(block.kind, content);
    if !missing.is_empty() {
        return Err(CoreError::Schema(
            missing
                .into_iter()
                .map(|message| FieldError {
                    path: "content".to_string(),
                    message,
                })
                .collect(),
        ));
    }
    Ok(block)
}

fn typed_config(descriptor: &BlockDescriptor, config: &Value) -> Result<BlockConfig, CoreError> {
    let mut map = config.as_object().cloned().unwrap_or_default();
    if !matches!(map.get("required"), Some(Value::Bool(_))) {
        map.insert(
            "required".to_string(),
            Value::Bool(descriptor.required_by_default),
        );
    }
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        CoreError::Schema(vec![FieldError {
            path: "config".to_string(),
            message: e.to_string(),
        }])
    })
}

/// Strip the leading type-tag segment from every path. Only the first
/// segment is touched, so a nested key equal to the tag survives.
pub fn rebase(errors: Vec<FieldError>, tag: &str) -> Vec<FieldError> {
    errors
        .into_iter()
        .map(|mut error| {
            if error.path == tag {
                error.path.clear();
            } else if let Some(rest) = error
                .path
                .strip_prefix(tag)
                .and_then(|p| p.strip_prefix('.'))
            {
                error.path = rest.to_string();
            }
            error
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Variant checks
// ---------------------------------------------------------------------------

/// Collects errors under a dotted path prefix.
struct Checker<'a> {
    prefix: String,
    errors: &'a mut Vec<FieldError>,
}

impl<'a> Checker<'a> {
    fn push(&mut self, rel: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: format!("{}.{}", self.prefix, rel),
            message: message.into(),
        });
    }

    fn object<'v>(&mut self, parent: &'v JsonMap, key: &str, rel: &str) -> Option<&'v JsonMap> {
        match parent.get(key) {
            None => {
                self.push(rel, "field required");
                None
            }
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.push(rel, "must be an object");
                None
            }
        }
    }
}

fn check_variant(
    descriptor: &BlockDescriptor,
    config: &Value,
    content: &Value,
    order_index: Option<&Value>,
    errors: &mut Vec<FieldError>,
) {
    let mut c = Checker {
        prefix: descriptor.kind.as_str().to_string(),
        errors,
    };

    match config {
        Value::Object(map) => check_config(descriptor, map, &mut c),
        _ => c.push("config", "must be an object"),
    }

    if !content.is_object() {
        c.push("content", "must be an object");
    }

    if let Some(index) = order_index.filter(|v| !v.is_null()) {
        match index.as_i64() {
            Some(i) if i >= 0 && i32::try_from(i).is_ok() => {}
            Some(_) => c.push("order_index", "must be a non-negative integer"),
            None => c.push("order_index", "must be an integer"),
        }
    }
}

fn check_config(descriptor: &BlockDescriptor, config: &JsonMap, c: &mut Checker<'_>) {
    match config.get("label") {
        Some(Value::String(_)) => {}
        None => c.push("config.label", "field required"),
        Some(_) => c.push("config.label", "must be a string"),
    }

    match config.get("description") {
        Some(Value::String(_)) | Some(Value::Null) => {}
        None => c.push("config.description", "field required"),
        Some(_) => c.push("config.description", "must be a string or null"),
    }

    match config.get("required") {
        None | Some(Value::Bool(_)) => {}
        Some(_) => c.push("config.required", "must be a boolean"),
    }

    if let Some(validation) = c.object(config, "validation", "config.validation") {
        check_validation(validation, c);
    }

    c.object(config, "display", "config.display");

    let section = descriptor.config_section;
    c.object(config, section, &format!("config.{section}"));
}

fn check_validation(validation: &JsonMap, c: &mut Checker<'_>) {
    match validation.get("rules") {
        None => c.push("config.validation.rules", "field required"),
        Some(Value::Array(rules)) => {
            for (i, rule) in rules.iter().enumerate() {
                check_rule(i, rule, c);
            }
        }
        Some(_) => c.push("config.validation.rules", "must be an array"),
    }

    match validation.get("messages") {
        None => c.push("config.validation.messages", "field required"),
        Some(Value::Object(messages)) => {
            for (key, message) in messages {
                if !message.is_string() {
                    c.push(
                        &format!("config.validation.messages.{key}"),
                        "must be a string",
                    );
                }
            }
        }
        Some(_) => c.push("config.validation.messages", "must be an object"),
    }
}

fn check_rule(index: usize, rule: &Value, c: &mut Checker<'_>) {
    let base = format!("config.validation.rules.{index}");
    let Some(rule) = rule.as_object() else {
        c.push(&base, "must be an object");
        return;
    };

    match rule.get("type") {
        Some(Value::String(name)) if RuleKind::from_name(name).is_some() => {}
        Some(Value::String(name)) => {
            c.push(&format!("{base}.type"), format!("unknown rule type '{name}'"));
        }
        None => c.push(&format!("{base}.type"), "field required"),
        Some(_) => c.push(&format!("{base}.type"), "must be a string"),
    }

    match rule.get("field") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => c.push(&format!("{base}.field"), "must be a string"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
