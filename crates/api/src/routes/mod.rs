pub mod content_blocks;
pub mod content_types;
pub mod health;
pub mod onboarding;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /content-types                                    list catalog (auth required)
/// /content-types/validate                           dry-run validation (POST)
/// /content-types/{name}                             get descriptor
/// /content-types/{name}/config                      default config
///
/// /stages/{stage_id}/content-blocks                 list, create (create admin only)
/// /stages/{stage_id}/content-blocks/reorder         reorder (PUT, admin only)
/// /content-blocks/{id}                              get, update, delete (writes admin only)
///
/// /onboarding/{token}                               learner view (session token)
/// /onboarding/{token}/start                         start (POST)
/// /onboarding/{token}/complete                      complete flow (POST)
/// /onboarding/{token}/progress                      progress overview
/// /onboarding/{token}/current-stage                 current stage
/// /onboarding/{token}/validate                      token status
/// /onboarding/{token}/renew                         renew expired token (POST)
/// /onboarding/{token}/uploads                       file upload (POST, multipart)
/// /onboarding/{token}/stages/{stage_id}             stage with blocks
/// /onboarding/{token}/stages/{stage_id}/status      stage progress
/// /onboarding/{token}/stages/{stage_id}/complete    confirm stage (POST)
/// /onboarding/{token}/stages/{stage_id}/content-blocks/{block_id}/complete
///                                                   submit block (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/content-types", content_types::router())
        // Stage-scoped and block-scoped authoring routes share one router.
        .merge(content_blocks::router())
        .nest("/onboarding", onboarding::router())
}
