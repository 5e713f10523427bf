pub mod content_blocks;
pub mod content_types;
pub mod onboarding;
