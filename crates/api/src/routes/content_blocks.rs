//! Route definitions for content block authoring.
//!
//! Merged at the `/api/v1` root because blocks are addressed both through
//! their stage and directly by id.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::content_blocks;
use crate::state::AppState;

/// Content block routes.
///
/// ```text
/// GET    /stages/{stage_id}/content-blocks           -> list_content_blocks
/// POST   /stages/{stage_id}/content-blocks           -> create_content_block (admin)
/// PUT    /stages/{stage_id}/content-blocks/reorder   -> reorder_content_blocks (admin)
/// GET    /content-blocks/{id}                        -> get_content_block
/// PUT    /content-blocks/{id}                        -> update_content_block (admin)
/// PATCH  /content-blocks/{id}                        -> update_content_block (admin)
/// DELETE /content-blocks/{id}                        -> delete_content_block (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/stages/{stage_id}/content-blocks",
            get(content_blocks::list_content_blocks).post(content_blocks::create_content_block),
        )
        .route(
            "/stages/{stage_id}/content-blocks/reorder",
            put(content_blocks::reorder_content_blocks),
        )
        .route(
            "/content-blocks/{id}",
            get(content_blocks::get_content_block)
                .put(content_blocks::update_content_block)
                .patch(content_blocks::update_content_block)
                .delete(content_blocks::delete_content_block),
        )
}
