//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument, or an open transaction for the
//! read-modify-write paths that must hold a row lock.

pub mod completion_repo;
pub mod content_block_repo;
pub mod learner_session_repo;
pub mod stage_repo;

pub use completion_repo::CompletionRepo;
pub use content_block_repo::ContentBlockRepo;
pub use learner_session_repo::LearnerSessionRepo;
pub use stage_repo::StageRepo;
