//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs where the resource is written through the API

pub mod completion;
pub mod content_block;
pub mod learner_session;
pub mod stage;
