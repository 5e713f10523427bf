//! Rating scale check.

use serde_json::Value;

use super::InputContext;
use crate::blocks::rules::RuleKind;

/// Integers and integer strings are accepted.
fn as_rating(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(super) fn check(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    if ctx.missing_scalar("rating") {
        errors.push("rating is required".to_string());
    }
    let Some(raw) = ctx.present("rating") else {
        return;
    };
    let Some(rating) = as_rating(raw) else {
        errors.push("rating must be an integer".to_string());
        return;
    };

    if let Some(min) = ctx.rules.int(RuleKind::MinValue) {
        if rating < min {
            errors.push(format!("rating must be at least {min}"));
        }
    }
    if let Some(max) = ctx.rules.int(RuleKind::MaxValue) {
        if rating > max {
            errors.push(format!("rating must be at most {max}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::blocks::catalog;
    use crate::blocks::BlockKind;
    use crate::input::tests::run;

    fn config() -> serde_json::Value {
        catalog::descriptor(BlockKind::RatingScale).default_config.clone()
    }

    #[test]
    fn in_range_ratings() {
        for rating in [json!(1), json!(5), json!("3")] {
            assert!(run("rating_scale", config(), json!({}), json!({"rating": rating})).valid);
        }
    }

    #[test]
    fn out_of_range_ratings() {
        assert_eq!(
            run("rating_scale", config(), json!({}), json!({"rating": 0})).errors,
            vec!["rating must be at least 1"]
        );
        assert_eq!(
            run("rating_scale", config(), json!({}), json!({"rating": 6})).errors,
            vec!["rating must be at most 5"]
        );
    }

    #[test]
    fn non_integer_ratings() {
        for rating in [json!(2.5), json!("three"), json!([3])] {
            assert_eq!(
                run("rating_scale", config(), json!({}), json!({"rating": rating})).errors,
                vec!["rating must be an integer"]
            );
        }
    }

    #[test]
    fn missing_rating() {
        assert_eq!(
            run("rating_scale", config(), json!({}), json!({"rating": null})).errors,
            vec!["rating is required"]
        );
    }
}
