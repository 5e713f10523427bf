//! Static registry of the sixteen content block kinds.
//!
//! The table is built once on first access and is read-only afterwards.
//! Each entry records the kind's category, the name of its type-specific
//! config section, the content fields the completeness check requires, the
//! rule kinds it honours, and a default `config`/`content` pair that passes
//! both admin-time checks.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{json, Value};

use super::rules::RuleKind;
use super::{BlockCategory, BlockKind, ALL_KINDS};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Descriptor types
// ---------------------------------------------------------------------------

/// UI grouping used by the admin block picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockGroup {
    Text,
    Media,
    Form,
    Navigation,
}

impl BlockGroup {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "media" => Some(Self::Media),
            "form" => Some(Self::Form),
            "navigation" => Some(Self::Navigation),
            _ => None,
        }
    }
}

/// A `content` field the completeness check insists on.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContentRequirement {
    pub field: &'static str,
    /// Reported when the field is absent or blank.
    pub missing_message: &'static str,
    /// Minimum element count for list-valued fields, with its message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<(usize, &'static str)>,
}

const fn field(name: &'static str, missing_message: &'static str) -> ContentRequirement {
    ContentRequirement {
        field: name,
        missing_message,
        min_items: None,
    }
}

const fn list_field(
    name: &'static str,
    missing_message: &'static str,
    min: usize,
    too_few_message: &'static str,
) -> ContentRequirement {
    ContentRequirement {
        field: name,
        missing_message,
        min_items: Some((min, too_few_message)),
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct BlockDescriptor {
    #[serde(rename = "name")]
    pub kind: BlockKind,
    pub display_name: &'static str,
    pub description: &'static str,
    pub category: BlockCategory,
    pub group: BlockGroup,
    /// Key of the type-specific object inside `config` (`question`, `input`, ...).
    pub config_section: &'static str,
    /// Default for `config.required` when the admin omits it.
    pub required_by_default: bool,
    pub content_requirements: &'static [ContentRequirement],
    pub rule_kinds: &'static [RuleKind],
    pub default_config: Value,
    pub default_content: Value,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

static CATALOG: LazyLock<Vec<BlockDescriptor>> =
    LazyLock::new(|| ALL_KINDS.iter().copied().map(build_descriptor).collect());

/// All descriptors, in catalog order.
pub fn all() -> &'static [BlockDescriptor] {
    &CATALOG
}

/// The descriptor for a known kind.
pub fn descriptor(kind: BlockKind) -> &'static BlockDescriptor {
    // CATALOG is built from ALL_KINDS in order, so every kind has an entry.
    let index = ALL_KINDS.iter().position(|k| *k == kind).unwrap_or_default();
    &CATALOG[index]
}

/// Look up a descriptor by type tag. Unknown tags are an error.
pub fn lookup(tag: &str) -> Result<&'static BlockDescriptor, CoreError> {
    BlockKind::parse(tag).map(descriptor)
}

/// Descriptors belonging to one UI group.
pub fn by_group(group: BlockGroup) -> Vec<&'static BlockDescriptor> {
    CATALOG.iter().filter(|d| d.group == group).collect()
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Standard `display` object; only the order differs between kinds.
fn display(width: &str, order: u32) -> Value {
    json!({"width": width, "order": order, "visibility": "always"})
}

fn build_descriptor(kind: BlockKind) -> BlockDescriptor {
    use RuleKind as R;

    match kind {
        BlockKind::Header => BlockDescriptor {
            kind,
            display_name: "Header",
            description: "Large text header for titles and sections",
            category: kind.category(),
            group: BlockGroup::Text,
            config_section: "style",
            required_by_default: false,
            content_requirements: const { &[field("title", "Header must have a title")] },
            rule_kinds: &[R::MaxLength],
            default_config: json!({
                "label": "Header",
                "description": "Section header with title and optional subtitle",
                "required": false,
                "validation": {
                    "rules": [
                        {"type": "max_length", "value": 100, "field": "title"},
                        {"type": "max_length", "value": 200, "field": "subtitle"}
                    ],
                    "messages": {
                        "title_max_length": "Title must be less than 100 characters",
                        "subtitle_max_length": "Subtitle must be less than 200 characters"
                    }
                },
                "display": display("full", 1),
                "style": {"title_size": "h1", "alignment": "left", "color": "primary"}
            }),
            default_content: json!({"title": "Welcome aboard", "subtitle": "Let's get you set up"}),
        },
        BlockKind::Description => BlockDescriptor {
            kind,
            display_name: "Description",
            description: "Regular text content for descriptions and explanations",
            category: kind.category(),
            group: BlockGroup::Text,
            config_section: "formatting",
            required_by_default: false,
            content_requirements: const { &[field("text", "Description must have text content")] },
            rule_kinds: &[R::MaxLength],
            default_config: json!({
                "label": "Description",
                "description": "Rich text content with formatting",
                "required": false,
                "validation": {
                    "rules": [{"type": "max_length", "value": 2000, "field": "text"}],
                    "messages": {"text_max_length": "Description must be less than 2000 characters"}
                },
                "display": display("full", 2),
                "formatting": {
                    "allow_bold": true,
                    "allow_italic": true,
                    "allow_links": true,
                    "allow_lists": true
                }
            }),
            default_content: json!({"text": "Here is what to expect over the next few days."}),
        },
        BlockKind::Media => BlockDescriptor {
            kind,
            display_name: "Media",
            description: "Images, videos, and other media content",
            category: kind.category(),
            group: BlockGroup::Media,
            config_section: "media",
            required_by_default: false,
            content_requirements: const { &[field("file_url", "Media must have a file URL")] },
            rule_kinds: &[R::FileType, R::FileSize],
            default_config: json!({
                "label": "Media",
                "description": "Image, video, or document display",
                "required": false,
                "validation": {
                    "rules": [
                        {
                            "type": "file_type",
                            "value": [
                                "image/jpeg", "image/png", "image/gif", "image/webp",
                                "video/mp4", "video/webm", "application/pdf"
                            ],
                            "field": "file"
                        },
                        {"type": "file_size", "value": 10_485_760, "field": "file"}
                    ],
                    "messages": {
                        "file_type": "Only images, videos, and PDFs are allowed",
                        "file_size": "File must be less than 10MB"
                    }
                },
                "display": display("full", 3),
                "media": {
                    "type": "image",
                    "autoplay": false,
                    "controls": true,
                    "caption": true,
                    "lightbox": true,
                    "download": false
                }
            }),
            default_content: json!({
                "file_url": "/uploads/welcome.png",
                "alt_text": "Team photo",
                "caption": "The team"
            }),
        },
        BlockKind::SingleChoice => BlockDescriptor {
            kind,
            display_name: "Single Choice",
            description: "Multiple choice question with single answer",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "question",
            required_by_default: true,
            content_requirements: const {
                &[
                    field("question", "Single choice must have a question"),
                    list_field(
                        "options",
                        "Single choice must have options",
                        2,
                        "Single choice must have at least 2 options",
                    ),
                ]
            },
            rule_kinds: &[R::Required, R::MinOptions, R::MaxOptions],
            default_config: json!({
                "label": "Single Choice Question",
                "description": "Multiple choice question with single answer",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "answer"},
                        {"type": "min_options", "value": 2, "field": "options"},
                        {"type": "max_options", "value": 10, "field": "options"}
                    ],
                    "messages": {
                        "required": "Please select an answer",
                        "min_options": "At least 2 options are required",
                        "max_options": "Maximum 10 options allowed"
                    }
                },
                "display": display("full", 4),
                "question": {
                    "allow_other": false,
                    "randomize_options": false,
                    "show_results": false
                }
            }),
            default_content: json!({
                "question": "Which office will you work from?",
                "options": [
                    {"id": "a", "label": "Headquarters"},
                    {"id": "b", "label": "Remote"}
                ]
            }),
        },
        BlockKind::MultipleChoice => BlockDescriptor {
            kind,
            display_name: "Multiple Choice",
            description: "Multiple choice question with multiple answers",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "question",
            required_by_default: true,
            content_requirements: const {
                &[
                    field("question", "Multiple choice must have a question"),
                    list_field(
                        "options",
                        "Multiple choice must have options",
                        2,
                        "Multiple choice must have at least 2 options",
                    ),
                ]
            },
            rule_kinds: &[
                R::Required,
                R::MinSelections,
                R::MaxSelections,
                R::MinOptions,
                R::MaxOptions,
            ],
            default_config: json!({
                "label": "Multiple Choice Question",
                "description": "Multiple choice question with multiple answers",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "answers"},
                        {"type": "min_selections", "value": 1, "field": "answers"},
                        {"type": "max_selections", "value": 5, "field": "answers"},
                        {"type": "min_options", "value": 2, "field": "options"},
                        {"type": "max_options", "value": 15, "field": "options"}
                    ],
                    "messages": {
                        "required": "Please select at least one answer",
                        "min_selections": "Please select at least one option",
                        "max_selections": "You can select up to 5 options"
                    }
                },
                "display": display("full", 5),
                "question": {
                    "allow_other": true,
                    "other_label": "Other (please specify)",
                    "randomize_options": false,
                    "show_results": false
                }
            }),
            default_content: json!({
                "question": "Which tools have you used before?",
                "options": [
                    {"id": "git", "label": "Git"},
                    {"id": "jira", "label": "Jira"},
                    {"id": "slack", "label": "Slack"}
                ]
            }),
        },
        BlockKind::TextInput => BlockDescriptor {
            kind,
            display_name: "Text Input",
            description: "Single line text input field",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "input",
            required_by_default: true,
            content_requirements: const { &[field("label", "Text input must have a label")] },
            rule_kinds: &[
                R::Required,
                R::MinLength,
                R::MaxLength,
                R::Pattern,
                R::Email,
                R::Url,
            ],
            default_config: json!({
                "label": "Text Input",
                "description": "Single line text input field",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "value"},
                        {"type": "min_length", "value": 2, "field": "value"},
                        {"type": "max_length", "value": 100, "field": "value"}
                    ],
                    "messages": {
                        "required": "This field is required",
                        "min_length": "Must be at least 2 characters",
                        "max_length": "Must be less than 100 characters"
                    }
                },
                "display": display("full", 6),
                "input": {"type": "text", "placeholder": "Enter your answer", "autocomplete": "off"}
            }),
            default_content: json!({"label": "Preferred name", "placeholder": "e.g. Sam"}),
        },
        BlockKind::TextArea => BlockDescriptor {
            kind,
            display_name: "Text Area",
            description: "Multi-line text input field",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "input",
            required_by_default: true,
            content_requirements: const { &[field("label", "Text area must have a label")] },
            rule_kinds: &[R::Required, R::MinLength, R::MaxLength],
            default_config: json!({
                "label": "Text Area",
                "description": "Multi-line text input field",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "value"},
                        {"type": "min_length", "value": 10, "field": "value"},
                        {"type": "max_length", "value": 1000, "field": "value"}
                    ],
                    "messages": {
                        "required": "This field is required",
                        "min_length": "Must be at least 10 characters",
                        "max_length": "Must be less than 1000 characters"
                    }
                },
                "display": display("full", 7),
                "input": {"rows": 4, "placeholder": "Enter your answer", "resizable": true}
            }),
            default_content: json!({"label": "Tell us a little about yourself"}),
        },
        BlockKind::FileUpload => BlockDescriptor {
            kind,
            display_name: "File Upload",
            description: "File upload field for documents and media",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "upload",
            required_by_default: true,
            content_requirements: const { &[field("label", "File upload must have a label")] },
            rule_kinds: &[R::Required, R::FileType, R::FileSize, R::MaxFiles],
            default_config: json!({
                "label": "File Upload",
                "description": "Upload documents or images",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "files"},
                        {
                            "type": "file_type",
                            "value": ["application/pdf", "image/jpeg", "image/png"],
                            "field": "files"
                        },
                        {"type": "file_size", "value": 5_242_880, "field": "files"},
                        {"type": "max_files", "value": 3, "field": "files"}
                    ],
                    "messages": {
                        "required": "Please upload at least one file",
                        "file_type": "Only PDF and image files are allowed",
                        "file_size": "Each file must be less than 5MB",
                        "max_files": "You can upload up to 3 files"
                    }
                },
                "display": display("full", 8),
                "upload": {"multiple": true, "drag_drop": true, "preview": true, "progress": true}
            }),
            default_content: json!({
                "label": "Upload a copy of your ID",
                "instructions": "PDF or image, up to 5MB"
            }),
        },
        BlockKind::ExternalLink => BlockDescriptor {
            kind,
            display_name: "External Link",
            description: "Link to external resources and websites",
            category: kind.category(),
            group: BlockGroup::Navigation,
            config_section: "link",
            required_by_default: false,
            content_requirements: const {
                &[
                    field("url", "External link must have a URL"),
                    field("title", "External link must have a title"),
                ]
            },
            rule_kinds: &[R::Url, R::MaxLength],
            default_config: json!({
                "label": "External Link",
                "description": "Link to external resources",
                "required": false,
                "validation": {
                    "rules": [
                        {"type": "url", "field": "url"},
                        {"type": "max_length", "value": 200, "field": "title"}
                    ],
                    "messages": {
                        "url": "Please enter a valid URL",
                        "title_max_length": "Title must be less than 200 characters"
                    }
                },
                "display": display("full", 9),
                "link": {"open_in_new_tab": true, "show_icon": true, "track_clicks": true}
            }),
            default_content: json!({
                "url": "https://example.com/handbook",
                "title": "Employee handbook"
            }),
        },
        BlockKind::Checklist => BlockDescriptor {
            kind,
            display_name: "Checklist",
            description: "Interactive checklist with checkboxes",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "checklist",
            required_by_default: true,
            content_requirements: const {
                &[
                    field("title", "Checklist must have a title"),
                    list_field(
                        "items",
                        "Checklist must have items",
                        2,
                        "Checklist must have at least 2 items",
                    ),
                ]
            },
            rule_kinds: &[R::Required, R::MinSelections, R::MinItems, R::MaxItems],
            default_config: json!({
                "label": "Checklist",
                "description": "Interactive checklist with items",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "checked_items"},
                        {"type": "min_selections", "value": 1, "field": "checked_items"},
                        {"type": "min_items", "value": 2, "field": "items"},
                        {"type": "max_items", "value": 20, "field": "items"}
                    ],
                    "messages": {
                        "required": "Please complete at least one item",
                        "min_selections": "Please check at least one item",
                        "min_items": "At least 2 items are required",
                        "max_items": "Maximum 20 items allowed"
                    }
                },
                "display": display("full", 10),
                "checklist": {"allow_partial": true, "show_progress": true, "auto_save": true}
            }),
            default_content: json!({
                "title": "Before your first day",
                "items": [
                    {"id": "1", "label": "Sign the contract"},
                    {"id": "2", "label": "Set up your laptop"}
                ]
            }),
        },
        BlockKind::Caution => BlockDescriptor {
            kind,
            display_name: "Caution",
            description: "Warning or important notice box",
            category: kind.category(),
            group: BlockGroup::Text,
            config_section: "caution",
            required_by_default: false,
            content_requirements: const { &[field("message", "Caution must have a message")] },
            rule_kinds: &[R::MaxLength],
            default_config: json!({
                "label": "Caution",
                "description": "Warning or important notice",
                "required": false,
                "validation": {
                    "rules": [{"type": "max_length", "value": 500, "field": "message"}],
                    "messages": {"message_max_length": "Message must be less than 500 characters"}
                },
                "display": display("full", 11),
                "caution": {"type": "warning", "dismissible": true, "icon": true}
            }),
            default_content: json!({"message": "Badges must be worn on site at all times."}),
        },
        BlockKind::List => BlockDescriptor {
            kind,
            display_name: "List",
            description: "Ordered or unordered list",
            category: kind.category(),
            group: BlockGroup::Text,
            config_section: "list",
            required_by_default: false,
            content_requirements: const {
                &[list_field(
                    "items",
                    "List must have items",
                    1,
                    "List must have at least one item",
                )]
            },
            rule_kinds: &[R::MinItems, R::MaxItems],
            default_config: json!({
                "label": "List",
                "description": "Ordered or unordered list",
                "required": false,
                "validation": {
                    "rules": [
                        {"type": "min_items", "value": 1, "field": "items"},
                        {"type": "max_items", "value": 50, "field": "items"}
                    ],
                    "messages": {
                        "min_items": "At least one item is required",
                        "max_items": "Maximum 50 items allowed"
                    }
                },
                "display": display("full", 12),
                "list": {"type": "unordered", "style": "bullet"}
            }),
            default_content: json!({"items": ["Meet your buddy", "Collect your laptop"]}),
        },
        BlockKind::Date => BlockDescriptor {
            kind,
            display_name: "Date",
            description: "Date picker input field",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "date",
            required_by_default: true,
            content_requirements: const { &[field("label", "Date picker must have a label")] },
            rule_kinds: &[R::Required, R::MinDate, R::MaxDate],
            default_config: json!({
                "label": "Date Selection",
                "description": "Select a specific date",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "date"},
                        {"type": "min_date", "value": "today", "field": "date"},
                        {"type": "max_date", "value": "+1year", "field": "date"}
                    ],
                    "messages": {
                        "required": "Please select a date",
                        "min_date": "Date cannot be in the past",
                        "max_date": "Date cannot be more than 1 year in the future"
                    }
                },
                "display": display("half", 13),
                "date": {
                    "format": "MM/DD/YYYY",
                    "allow_past": false,
                    "allow_future": true,
                    "show_calendar": true,
                    "placeholder": "Select date"
                }
            }),
            default_content: json!({"label": "Preferred start date"}),
        },
        BlockKind::TimePicker => BlockDescriptor {
            kind,
            display_name: "Time Picker",
            description: "Time selection input field",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "time",
            required_by_default: true,
            content_requirements: const { &[field("label", "Time picker must have a label")] },
            rule_kinds: &[R::Required, R::MinTime, R::MaxTime],
            default_config: json!({
                "label": "Time Selection",
                "description": "Select a specific time",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "time"},
                        {"type": "min_time", "value": "09:00", "field": "time"},
                        {"type": "max_time", "value": "17:00", "field": "time"}
                    ],
                    "messages": {
                        "required": "Please select a time",
                        "min_time": "Time must be after 9:00 AM",
                        "max_time": "Time must be before 5:00 PM"
                    }
                },
                "display": display("half", 14),
                "time": {"format": "24", "interval": 15, "show_seconds": false, "timezone": "local"}
            }),
            default_content: json!({"label": "Best time for your welcome call"}),
        },
        BlockKind::RatingScale => BlockDescriptor {
            kind,
            display_name: "Rating Scale",
            description: "Rating or scale input (1-5, 1-10, etc.)",
            category: kind.category(),
            group: BlockGroup::Form,
            config_section: "rating",
            required_by_default: true,
            content_requirements: const {
                &[field("question", "Rating scale must have a question")]
            },
            rule_kinds: &[R::Required, R::MinValue, R::MaxValue],
            default_config: json!({
                "label": "Rating Scale",
                "description": "Rate something on a scale",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "rating"},
                        {"type": "min_value", "value": 1, "field": "rating"},
                        {"type": "max_value", "value": 5, "field": "rating"}
                    ],
                    "messages": {
                        "required": "Please provide a rating",
                        "min_value": "Rating must be at least 1",
                        "max_value": "Rating cannot exceed 5"
                    }
                },
                "display": display("full", 15),
                "rating": {
                    "type": "stars",
                    "scale": 5,
                    "show_labels": true,
                    "show_value": true,
                    "allow_half": false
                }
            }),
            default_content: json!({
                "question": "How clear was this section?",
                "labels": {"min": "Not clear", "max": "Very clear"}
            }),
        },
        BlockKind::VisualAudio => BlockDescriptor {
            kind,
            display_name: "Visual or Audio Content",
            description: "Interactive visual or audio content with responses",
            category: kind.category(),
            group: BlockGroup::Media,
            config_section: "media",
            required_by_default: true,
            content_requirements: const {
                &[
                    field("title", "Visual/audio content must have a title"),
                    field("prompt", "Visual/audio content must have a prompt"),
                ]
            },
            rule_kinds: &[R::Required, R::FileType, R::FileSize],
            default_config: json!({
                "label": "Visual or Audio Content",
                "description": "Interactive visual or audio content with responses",
                "required": true,
                "validation": {
                    "rules": [
                        {"type": "required", "field": "response"},
                        {
                            "type": "file_type",
                            "value": [
                                "audio/wav", "audio/mp3", "audio/m4a", "video/mp4", "video/webm"
                            ],
                            "field": "recording"
                        },
                        {"type": "file_size", "value": 52_428_800, "field": "recording"}
                    ],
                    "messages": {
                        "required": "Please provide your response",
                        "file_type": "Only audio and video files are allowed",
                        "file_size": "Recording must be less than 50MB"
                    }
                },
                "display": display("full", 16),
                "media": {
                    "type": "audio",
                    "recording": true,
                    "playback": true,
                    "transcription": true,
                    "max_duration": 300
                }
            }),
            default_content: json!({
                "title": "Introduce yourself",
                "prompt": "Record a short hello for the team"
            }),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
