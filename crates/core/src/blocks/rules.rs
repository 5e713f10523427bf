//! Validation rule vocabulary for `config.validation.rules[]`.
//!
//! Each rule is a `{type, value, field}` triple. A rule that is not present
//! simply does not constrain anything.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::JsonMap;

// ---------------------------------------------------------------------------
// Rule kinds
// ---------------------------------------------------------------------------

/// Every rule type an admin may put in `config.validation.rules[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    MinOptions,
    MaxOptions,
    MinSelections,
    MaxSelections,
    FileType,
    FileSize,
    MaxFiles,
    Pattern,
    MinValue,
    MaxValue,
    MinDate,
    MaxDate,
    MinTime,
    MaxTime,
    MinItems,
    MaxItems,
    Url,
    Email,
}

/// All rule kinds, used to validate admin-authored rule lists.
pub const ALL_RULE_KINDS: [RuleKind; 21] = [
    RuleKind::Required,
    RuleKind::MinLength,
    RuleKind::MaxLength,
    RuleKind::MinOptions,
    RuleKind::MaxOptions,
    RuleKind::MinSelections,
    RuleKind::MaxSelections,
    RuleKind::FileType,
    RuleKind::FileSize,
    RuleKind::MaxFiles,
    RuleKind::Pattern,
    RuleKind::MinValue,
    RuleKind::MaxValue,
    RuleKind::MinDate,
    RuleKind::MaxDate,
    RuleKind::MinTime,
    RuleKind::MaxTime,
    RuleKind::MinItems,
    RuleKind::MaxItems,
    RuleKind::Url,
    RuleKind::Email,
];

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::MinOptions => "min_options",
            Self::MaxOptions => "max_options",
            Self::MinSelections => "min_selections",
            Self::MaxSelections => "max_selections",
            Self::FileType => "file_type",
            Self::FileSize => "file_size",
            Self::MaxFiles => "max_files",
            Self::Pattern => "pattern",
            Self::MinValue => "min_value",
            Self::MaxValue => "max_value",
            Self::MinDate => "min_date",
            Self::MaxDate => "max_date",
            Self::MinTime => "min_time",
            Self::MaxTime => "max_time",
            Self::MinItems => "min_items",
            Self::MaxItems => "max_items",
            Self::Url => "url",
            Self::Email => "email",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_RULE_KINDS.iter().copied().find(|k| k.as_str() == name)
    }
}

// ---------------------------------------------------------------------------
// Rule entries
// ---------------------------------------------------------------------------

/// One `{type, value, field}` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// A read-only view of the rule-bearing parts of a persisted `config`.
///
/// Persisted configs have passed admin validation at creation time, but a
/// later partial update only re-runs the completeness check, so every lookup
/// here is lenient: malformed entries are skipped rather than rejected.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet<'a> {
    config: &'a Value,
}

impl<'a> RuleSet<'a> {
    pub fn new(config: &'a Value) -> Self {
        Self { config }
    }

    /// `config.required`, defaulting to `false`.
    pub fn is_required(&self) -> bool {
        self.config
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn entries(&self) -> impl Iterator<Item = &'a JsonMap> {
        self.config
            .get("validation")
            .and_then(|v| v.get("rules"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    /// The `value` of the first rule of the given kind, if any.
    pub fn value(&self, kind: RuleKind) -> Option<&'a Value> {
        self.entries()
            .find(|rule| rule.get("type").and_then(Value::as_str) == Some(kind.as_str()))
            .and_then(|rule| rule.get("value"))
    }

    /// The rule value when it is a JSON integer.
    pub fn int(&self, kind: RuleKind) -> Option<i64> {
        self.value(kind).and_then(Value::as_i64)
    }

    /// The rule value when it is a string.
    pub fn text(&self, kind: RuleKind) -> Option<&'a str> {
        self.value(kind).and_then(Value::as_str)
    }

    /// The rule value as a list of strings; non-string elements are dropped.
    pub fn text_list(&self, kind: RuleKind) -> Vec<&'a str> {
        self.value(kind)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
