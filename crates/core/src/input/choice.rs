//! Option-picking kinds: single choice, multiple choice, checklist.

use std::collections::HashSet;

use serde_json::Value;

use super::{display_value, InputContext};
use crate::blocks::completeness::is_blank;
use crate::blocks::rules::RuleKind;

/// Ids a learner may pick from `content.options`. Object options use `id`,
/// falling back to `value` when `id` is blank; bare options are used as-is.
fn option_ids(content: &Value) -> HashSet<String> {
    let Some(options) = content.get("options").and_then(Value::as_array) else {
        return HashSet::new();
    };
    options
        .iter()
        .filter_map(|option| match option {
            Value::Object(map) => {
                let id = map.get("id").filter(|v| !is_blank(Some(v)));
                id.or_else(|| map.get("value"))
                    .filter(|v| !v.is_null())
                    .map(display_value)
            }
            other => Some(display_value(other)),
        })
        .collect()
}

/// Ids of `content.items` entries that carry a non-null `id`.
fn checklist_ids(content: &Value) -> HashSet<String> {
    content
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("id").filter(|v| !v.is_null()))
        .map(display_value)
        .collect()
}

pub(super) fn single(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    if ctx.missing_scalar("answer") {
        errors.push("answer is required".to_string());
    }
    if let Some(answer) = ctx.present("answer") {
        if !option_ids(ctx.content).contains(&display_value(answer)) {
            errors.push("Selected answer is not in options".to_string());
        }
    }
}

pub(super) fn multiple(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    if ctx.missing_list("answers") {
        errors.push("answers are required".to_string());
    }
    let Some(answers) = ctx.present("answers") else {
        return;
    };
    let Some(answers) = answers.as_array() else {
        errors.push("answers must be a list".to_string());
        return;
    };

    let valid = option_ids(ctx.content);
    for answer in answers {
        let id = display_value(answer);
        if !valid.contains(&id) {
            errors.push(format!("Selected answer '{id}' is not in options"));
        }
    }

    let count = answers.len() as i64;
    if let Some(min) = ctx.rules.int(RuleKind::MinSelections) {
        if count < min {
            errors.push(format!("At least {min} selections required"));
        }
    }
    if let Some(max) = ctx.rules.int(RuleKind::MaxSelections) {
        if count > max {
            errors.push(format!("At most {max} selections allowed"));
        }
    }
}

pub(super) fn checklist(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    if ctx.missing_list("checked_items") {
        errors.push("checked_items are required".to_string());
    }
    let Some(checked) = ctx.present("checked_items") else {
        return;
    };
    let Some(checked) = checked.as_array() else {
        errors.push("checked_items must be a list".to_string());
        return;
    };

    let valid = checklist_ids(ctx.content);
    for item in checked {
        let id = display_value(item);
        if !valid.contains(&id) {
            errors.push(format!("checked item '{id}' is not in items"));
        }
    }

    if let Some(min) = ctx.rules.int(RuleKind::MinSelections) {
        if (checked.len() as i64) < min {
            errors.push(format!("At least {min} items must be checked"));
        }
    }
}
