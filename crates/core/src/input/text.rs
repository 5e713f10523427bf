//! Free-text kinds: text input and text area.

use regex::Regex;

use super::InputContext;
use crate::blocks::rules::RuleKind;

/// `pattern` must match the whole value. A pattern that does not compile
/// constrains nothing.
fn matches_fully(pattern: &str, value: &str) -> Option<bool> {
    Regex::new(&format!("^(?:{pattern})$"))
        .ok()
        .map(|re| re.is_match(value))
}

/// `with_pattern` is set for single-line inputs only.
pub(super) fn check(ctx: &InputContext<'_>, with_pattern: bool, errors: &mut Vec<String>) {
    if ctx.missing_scalar("value") {
        errors.push("value is required".to_string());
    }
    let Some(value) = ctx.present("value") else {
        return;
    };
    let Some(value) = value.as_str() else {
        errors.push("value must be a string".to_string());
        return;
    };

    let len = value.chars().count() as i64;
    if let Some(min) = ctx.rules.int(RuleKind::MinLength) {
        if len < min {
            errors.push(format!("value must be at least {min} characters"));
        }
    }
    if let Some(max) = ctx.rules.int(RuleKind::MaxLength) {
        if len > max {
            errors.push(format!("value must be at most {max} characters"));
        }
    }

    if with_pattern {
        if let Some(pattern) = ctx.rules.text(RuleKind::Pattern) {
            if matches_fully(pattern, value) == Some(false) {
                errors.push("value does not match required pattern".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::matches_fully;
    use crate::input::tests::run;

    fn config(rules: Value) -> Value {
        json!({"required": true, "validation": {"rules": rules}})
    }

    #[test]
    fn length_bounds_count_characters() {
        let cfg = config(json!([
            {"type": "min_length", "value": 2},
            {"type": "max_length", "value": 4}
        ]));
        assert!(run("text_input", cfg.clone(), json!({}), json!({"value": "héé"})).valid);
        assert_eq!(
            run("text_input", cfg.clone(), json!({}), json!({"value": "x"})).errors,
            vec!["value must be at least 2 characters"]
        );
        assert_eq!(
            run("text_area", cfg, json!({}), json!({"value": "abcdef"})).errors,
            vec!["value must be at most 4 characters"]
        );
    }

    #[test]
    fn empty_required_value_also_runs_length_rules() {
        let cfg = config(json!([{"type": "min_length", "value": 1}]));
        assert_eq!(
            run("text_input", cfg, json!({}), json!({"value": ""})).errors,
            vec!["value is required", "value must be at least 1 characters"]
        );
    }

    #[test]
    fn non_string_value() {
        let report = run("text_area", config(json!([])), json!({}), json!({"value": 12}));
        assert_eq!(report.errors, vec!["value must be a string"]);
    }

    #[test]
    fn pattern_is_a_full_match_on_text_input_only() {
        let cfg = config(json!([{"type": "pattern", "value": "[0-9]{3}"}]));
        assert!(run("text_input", cfg.clone(), json!({}), json!({"value": "123"})).valid);
        assert_eq!(
            run("text_input", cfg.clone(), json!({}), json!({"value": "1234"})).errors,
            vec!["value does not match required pattern"]
        );
        assert!(run("text_area", cfg, json!({}), json!({"value": "abc"})).valid);
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        assert_eq!(matches_fully("a|b", "ab"), Some(false));
        assert_eq!(matches_fully("a|b", "b"), Some(true));
    }

    #[test]
    fn broken_pattern_is_ignored() {
        assert_eq!(matches_fully("(unclosed", "x"), None);
        let cfg = config(json!([{"type": "pattern", "value": "(unclosed"}]));
        assert!(run("text_input", cfg, json!({}), json!({"value": "anything"})).valid);
    }
}
