//! Route definitions for the learner-facing onboarding flow.
//!
//! Mounted at `/onboarding` by `api_routes()`. No bearer auth: the session
//! token in the path identifies the learner.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Onboarding routes.
///
/// ```text
/// GET    /{token}                                    -> get_session
/// POST   /{token}/start                              -> start_onboarding
/// POST   /{token}/complete                           -> complete_onboarding
/// GET    /{token}/progress                           -> get_progress
/// GET    /{token}/current-stage                      -> get_current_stage
/// GET    /{token}/validate                           -> validate_session
/// POST   /{token}/renew                              -> renew_session
/// POST   /{token}/uploads                            -> upload_file
/// GET    /{token}/stages/{stage_id}                  -> get_stage
/// GET    /{token}/stages/{stage_id}/status           -> get_stage_status
/// POST   /{token}/stages/{stage_id}/complete         -> complete_stage
/// POST   /{token}/stages/{stage_id}/content-blocks/{block_id}/complete
///                                                    -> complete_content_block
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(onboarding::get_session))
        .route("/{token}/start", post(onboarding::start_onboarding))
        .route("/{token}/complete", post(onboarding::complete_onboarding))
        .route("/{token}/progress", get(onboarding::get_progress))
        .route("/{token}/current-stage", get(onboarding::get_current_stage))
        .route("/{token}/validate", get(onboarding::validate_session))
        .route("/{token}/renew", post(onboarding::renew_session))
        // The handler enforces its own size ceiling while streaming.
        .route(
            "/{token}/uploads",
            post(onboarding::upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/{token}/stages/{stage_id}", get(onboarding::get_stage))
        .route(
            "/{token}/stages/{stage_id}/status",
            get(onboarding::get_stage_status),
        )
        .route(
            "/{token}/stages/{stage_id}/complete",
            post(onboarding::complete_stage),
        )
        .route(
            "/{token}/stages/{stage_id}/content-blocks/{block_id}/complete",
            post(onboarding::complete_content_block),
        )
}
