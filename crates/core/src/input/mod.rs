//! Validation of learner-submitted data against a persisted block.
//!
//! Independent of the admin schema: here the block's `config` rules and
//! `content` are the reference, and the learner's `data` is what gets checked.
//! Every applicable check runs and all messages are returned together.

mod choice;
mod files;
mod rating;
mod temporal;
mod text;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::blocks::rules::RuleSet;
use crate::blocks::BlockKind;
use crate::error::CoreError;
use crate::types::JsonMap;

/// Result of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl InputReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Turn an invalid report into [`CoreError::InputValidation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.valid {
            Ok(())
        } else {
            Err(CoreError::InputValidation(self.errors))
        }
    }
}

/// Everything a per-kind check reads.
pub(crate) struct InputContext<'a> {
    pub rules: RuleSet<'a>,
    pub content: &'a Value,
    pub data: &'a JsonMap,
    pub today: NaiveDate,
}

impl<'a> InputContext<'a> {
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.data.get(name)
    }

    /// Present in the submission and not JSON `null`.
    pub fn present(&self, name: &str) -> Option<&'a Value> {
        self.field(name).filter(|v| !v.is_null())
    }

    /// Required scalar check: absent, null, and `""` all count as missing.
    pub fn missing_scalar(&self, name: &str) -> bool {
        self.rules.is_required()
            && match self.field(name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            }
    }

    /// Required list check: anything but a non-empty array counts as missing.
    pub fn missing_list(&self, name: &str) -> bool {
        self.rules.is_required()
            && !matches!(self.field(name), Some(Value::Array(items)) if !items.is_empty())
    }
}

/// Render a JSON value the way it appears in messages and id comparisons:
/// strings bare, everything else as JSON text.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate a submission envelope (`{"data": {...}}`) for a block.
pub fn validate_user_input(
    block_type: &str,
    config: &Value,
    content: &Value,
    submission: &Value,
) -> InputReport {
    validate_user_input_at(block_type, config, content, submission, Utc::now().date_naive())
}

/// As [`validate_user_input`], with "today" fixed for date markers.
pub fn validate_user_input_at(
    block_type: &str,
    config: &Value,
    content: &Value,
    submission: &Value,
    today: NaiveDate,
) -> InputReport {
    let tag = block_type.trim();
    let Ok(kind) = BlockKind::parse(tag) else {
        return InputReport::from_errors(vec![format!(
            "Unsupported content type '{tag}' for user input validation"
        )]);
    };
    if kind.is_display_only() {
        return InputReport::from_errors(Vec::new());
    }

    let empty = JsonMap::new();
    let data = submission
        .get("data")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut errors = Vec::new();
    if let Some(declared) = data.get("type").filter(|v| !v.is_null()) {
        if declared.as_str() != Some(kind.as_str()) {
            errors.push(format!(
                "Submission type '{}' does not match content block type '{kind}'",
                display_value(declared)
            ));
        }
    }

    let ctx = InputContext {
        rules: RuleSet::new(config),
        content,
        data,
        today,
    };

    match kind {
        BlockKind::SingleChoice => choice::single(&ctx, &mut errors),
        BlockKind::MultipleChoice => choice::multiple(&ctx, &mut errors),
        BlockKind::Checklist => choice::checklist(&ctx, &mut errors),
        BlockKind::TextInput => text::check(&ctx, true, &mut errors),
        BlockKind::TextArea => text::check(&ctx, false, &mut errors),
        BlockKind::FileUpload => files::upload(&ctx, &mut errors),
        BlockKind::VisualAudio => files::visual_audio(&ctx, &mut errors),
        BlockKind::Date => temporal::date(&ctx, &mut errors),
        BlockKind::TimePicker => temporal::time(&ctx, &mut errors),
        BlockKind::RatingScale => rating::check(&ctx, &mut errors),
        BlockKind::Header
        | BlockKind::Description
        | BlockKind::Media
        | BlockKind::ExternalLink
        | BlockKind::Caution
        | BlockKind::List => {}
    }

    InputReport::from_errors(errors)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    pub fn run(block_type: &str, config: Value, content: Value, data: Value) -> InputReport {
        validate_user_input_at(block_type, &config, &content, &json!({"data": data}), today())
    }

    #[test]
    fn display_only_kinds_always_pass() {
        for tag in ["header", "description", "media", "external_link", "list", "caution"] {
            let report = run(tag, json!({"required": true}), json!({}), json!({"junk": 1}));
            assert!(report.valid, "{tag}");
        }
    }

    #[test]
    fn unsupported_type_is_an_error() {
        let report = run("slider", json!({}), json!({}), json!({}));
        assert_eq!(
            report.errors,
            vec!["Unsupported content type 'slider' for user input validation"]
        );
    }

    #[test]
    fn mismatched_type_discriminator_is_reported() {
        let report = run(
            "rating_scale",
            json!({"required": true}),
            json!({}),
            json!({"type": "single_choice", "rating": 3}),
        );
        assert_eq!(
            report.errors,
            vec!["Submission type 'single_choice' does not match content block type 'rating_scale'"]
        );
    }

    #[test]
    fn missing_envelope_is_treated_as_empty_data() {
        let report = validate_user_input_at(
            "text_area",
            &json!({"required": true}),
            &json!({}),
            &json!({"value": "outside the envelope"}),
            today(),
        );
        assert_eq!(report.errors, vec!["value is required"]);
    }

    #[test]
    fn into_result_maps_to_input_validation() {
        let report = InputReport::from_errors(vec!["x".into()]);
        assert!(matches!(
            report.into_result(),
            Err(CoreError::InputValidation(errors)) if errors == vec!["x".to_string()]
        ));
        assert!(InputReport::from_errors(Vec::new()).into_result().is_ok());
    }
}
