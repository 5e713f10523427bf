//! Route definitions for the block catalog.
//!
//! Mounted at `/content-types` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::content_types;
use crate::state::AppState;

/// Catalog routes.
///
/// ```text
/// GET    /                 -> list_content_types (?group=)
/// POST   /validate         -> validate_content
/// GET    /{name}           -> get_content_type
/// GET    /{name}/config    -> get_content_type_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(content_types::list_content_types))
        .route("/validate", post(content_types::validate_content))
        .route("/{name}", get(content_types::get_content_type))
        .route("/{name}/config", get(content_types::get_content_type_config))
}
