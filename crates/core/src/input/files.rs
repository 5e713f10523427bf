//! File-carrying kinds: file upload and visual/audio responses.
//!
//! Only the `{file_type, file_size}` metadata is checked; the bytes were
//! stored earlier through the upload endpoint.

use serde_json::Value;

use super::{display_value, InputContext};
use crate::blocks::completeness::is_blank;
use crate::blocks::rules::RuleKind;
use crate::types::JsonMap;

struct FileLimits<'a> {
    allowed_types: Vec<&'a str>,
    max_size: Option<i64>,
}

impl<'a> FileLimits<'a> {
    fn from_ctx(ctx: &InputContext<'a>) -> Self {
        Self {
            allowed_types: ctx.rules.text_list(RuleKind::FileType),
            max_size: ctx.rules.int(RuleKind::FileSize),
        }
    }

    /// `None` when the type is acceptable, otherwise the rendered type.
    fn rejected_type(&self, file: &JsonMap) -> Option<String> {
        if self.allowed_types.is_empty() {
            return None;
        }
        let file_type = file.get("file_type");
        match file_type.and_then(Value::as_str) {
            Some(t) if self.allowed_types.contains(&t) => None,
            _ => Some(file_type.map(display_value).unwrap_or_else(|| "null".to_string())),
        }
    }

    fn too_large(&self, file: &JsonMap) -> Option<i64> {
        let size = file.get("file_size").and_then(Value::as_i64)?;
        self.max_size.filter(|max| size > *max)
    }
}

pub(super) fn upload(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    if ctx.missing_list("files") {
        errors.push("files are required".to_string());
    }
    let Some(files) = ctx.present("files") else {
        return;
    };
    let Some(files) = files.as_array() else {
        errors.push("files must be a list".to_string());
        return;
    };

    let limits = FileLimits::from_ctx(ctx);
    if let Some(max_files) = ctx.rules.int(RuleKind::MaxFiles) {
        if files.len() as i64 > max_files {
            errors.push(format!("At most {max_files} files allowed"));
        }
    }

    for file in files {
        let Some(file) = file.as_object() else {
            errors.push("each file must be an object with file_type and file_size".to_string());
            continue;
        };
        if let Some(file_type) = limits.rejected_type(file) {
            errors.push(format!("file_type '{file_type}' not allowed"));
        }
        if let Some(max) = limits.too_large(file) {
            errors.push(format!("file_size exceeds limit {max}"));
        }
    }
}

pub(super) fn visual_audio(ctx: &InputContext<'_>, errors: &mut Vec<String>) {
    let response = ctx.field("response");
    let recording = ctx.field("recording");
    if ctx.rules.is_required() && is_blank(response) && is_blank(recording) {
        errors.push("response or recording is required".to_string());
    }

    let Some(recording) = recording.filter(|v| !v.is_null()) else {
        return;
    };
    let Some(recording) = recording.as_object() else {
        errors.push("recording must be an object with file_type and file_size".to_string());
        return;
    };

    let limits = FileLimits::from_ctx(ctx);
    if let Some(file_type) = limits.rejected_type(recording) {
        errors.push(format!("recording file_type '{file_type}' not allowed"));
    }
    if let Some(max) = limits.too_large(recording) {
        errors.push(format!("recording file_size exceeds limit {max}"));
    }
}
