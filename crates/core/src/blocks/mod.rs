//! Content block type system.
//!
//! A content block is one of sixteen fixed kinds. Each kind has an
//! admin-authored `config` (validation rules + display options) and `content`
//! (the authored payload), both checked here before anything is persisted.
//!
//! - [`catalog`] -- the static registry of kinds and their defaults.
//! - [`rules`] -- the `config.validation.rules[]` vocabulary and lookups.
//! - [`schema`] -- admin-time shape validation of `{type, config, content}`.
//! - [`completeness`] -- the lighter per-kind content check.
//! - [`merge`] -- deep merge for partial updates.
//! - [`update`] -- merge-then-validate planning for PATCH requests.

pub mod catalog;
pub mod completeness;
pub mod merge;
pub mod rules;
pub mod schema;
pub mod update;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Block kinds
// ---------------------------------------------------------------------------

/// The closed set of content block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Header,
    Description,
    Media,
    SingleChoice,
    MultipleChoice,
    TextInput,
    TextArea,
    FileUpload,
    ExternalLink,
    Checklist,
    Caution,
    List,
    Date,
    TimePicker,
    RatingScale,
    VisualAudio,
}

/// Every kind, in catalog order.
pub const ALL_KINDS: [BlockKind; 16] = [
    BlockKind::Header,
    BlockKind::Description,
    BlockKind::Media,
    BlockKind::SingleChoice,
    BlockKind::MultipleChoice,
    BlockKind::TextInput,
    BlockKind::TextArea,
    BlockKind::FileUpload,
    BlockKind::ExternalLink,
    BlockKind::Checklist,
    BlockKind::Caution,
    BlockKind::List,
    BlockKind::Date,
    BlockKind::TimePicker,
    BlockKind::RatingScale,
    BlockKind::VisualAudio,
];

impl BlockKind {
    /// Parse a type tag as stored in `content_blocks.block_type`.
    pub fn parse(tag: &str) -> Result<Self, CoreError> {
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| CoreError::UnknownBlockType(tag.to_string()))
    }

    /// The wire / database tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Description => "description",
            Self::Media => "media",
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::TextInput => "text_input",
            Self::TextArea => "text_area",
            Self::FileUpload => "file_upload",
            Self::ExternalLink => "external_link",
            Self::Checklist => "checklist",
            Self::Caution => "caution",
            Self::List => "list",
            Self::Date => "date",
            Self::TimePicker => "time_picker",
            Self::RatingScale => "rating_scale",
            Self::VisualAudio => "visual_audio",
        }
    }

    /// Whether the kind collects learner input.
    pub fn category(self) -> BlockCategory {
        match self {
            Self::Header
            | Self::Description
            | Self::Media
            | Self::ExternalLink
            | Self::List
            | Self::Caution => BlockCategory::DisplayOnly,
            Self::SingleChoice
            | Self::MultipleChoice
            | Self::TextInput
            | Self::TextArea
            | Self::FileUpload
            | Self::Checklist
            | Self::Date
            | Self::TimePicker
            | Self::RatingScale
            | Self::VisualAudio => BlockCategory::InputCapable,
        }
    }

    pub fn is_display_only(self) -> bool {
        self.category() == BlockCategory::DisplayOnly
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only kinds never require learner input and are always satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockCategory {
    DisplayOnly,
    InputCapable,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
