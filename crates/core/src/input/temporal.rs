//! Date and time picker checks.

use std::sync::LazyLock;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use super::{display_value, InputContext};
use crate::blocks::rules::RuleKind;

/// `+<N><unit>` relative date markers. Months are 30 days, years 365.
static RELATIVE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+(\d+)(days?|months?|years?)").expect("valid regex"));

/// Parse an ISO date, also accepting a full ISO datetime (date part kept).
fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Resolve a `min_date`/`max_date` marker against `today`. Markers that
/// cannot be resolved impose no bound.
pub(crate) fn resolve_date_marker(marker: &Value, today: NaiveDate) -> Option<NaiveDate> {
    let marker = marker.as_str().filter(|m| !m.is_empty())?;
    if marker == "today" {
        return Some(today);
    }
    if let Some(caps) = RELATIVE_MARKER.captures(marker) {
        let qty: u64 = caps[1].parse().ok()?;
        let days = match &caps[2] {
            unit if unit.starts_with("day") => qty,
            unit if unit.starts_with("month") => qty.checked_mul(30)?,
            _ => qty.checked_mul(365)?,
        };
        return today.checked_add_days(Days::new(days));
    }
    parse_iso_date(marker)
}

pub(super) fn date(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    if ctx.missing_scalar("date") {
        errors.push("date is required".to_string());
    }
    let Some(raw) = ctx.present("date") else {
        return;
    };
    let Some(picked) = parse_iso_date(&display_value(raw)) else {
        errors.push("date must be an ISO date string".to_string());
        return;
    };

    let bound = |kind: RuleKind| {
        ctx.rules
            .value(kind)
            .and_then(|marker| resolve_date_marker(marker, ctx.today))
    };
    if matches!(bound(RuleKind::MinDate), Some(min) if picked < min) {
        errors.push("date is earlier than allowed minimum".to_string());
    }
    if matches!(bound(RuleKind::MaxDate), Some(max) if picked > max) {
        errors.push("date is later than allowed maximum".to_string());
    }
}

/// Split `HH:MM[:...]` into hour and minute without range checking.
fn split_clock(raw: &str) -> Option<(i64, i64)> {
    let mut parts = raw.split(':');
    let hours = parts.next()?.trim().parse().ok()?;
    let minutes = parts.next()?.trim().parse().ok()?;
    Some((hours, minutes))
}

pub(super) fn time(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    if ctx.missing_scalar("time") {
        errors.push("time is required".to_string());
    }
    let Some(raw) = ctx.present("time") else {
        return;
    };
    let Some((hours, minutes)) = split_clock(&display_value(raw)) else {
        errors.push("time must be in HH:MM format".to_string());
        return;
    };
    if !((0..=23).contains(&hours) && (0..=59).contains(&minutes)) {
        errors.push("time must be in HH:MM 24h format".to_string());
    }

    let value = hours * 60 + minutes;
    let bound = |kind: RuleKind| {
        ctx.rules
            .text(kind)
            .and_then(split_clock)
            .map(|(h, m)| h * 60 + m)
    };
    if matches!(bound(RuleKind::MinTime), Some(min) if value < min) {
        errors.push("time is earlier than allowed minimum".to_string());
    }
    if matches!(bound(RuleKind::MaxTime), Some(max) if value > max) {
        errors.push("time is later than allowed maximum".to_string());
    }
}
