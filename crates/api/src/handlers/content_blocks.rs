//! Handlers for content block authoring.
//!
//! Creation runs the schema validator plus the completeness check. Updates
//! lock the row, merge and re-check in memory, and write only if the merged
//! block is still complete. A rejected update drops the transaction, so the
//! stored block is untouched.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use onramp_core::blocks::schema::validate_new_block;
use onramp_core::blocks::update::apply_partial_update;
use onramp_core::error::CoreError;
use onramp_core::types::DbId;
use onramp_db::models::content_block::{
    ContentBlock, CreateContentBlock, ReorderContentBlocks, UpdateContentBlock,
};
use onramp_db::repositories::{ContentBlockRepo, StageRepo};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_stage_exists(state: &AppState, stage_id: DbId) -> AppResult<()> {
    StageRepo::find_by_id(&state.pool, stage_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Stage",
            id: stage_id,
        })?;
    Ok(())
}

/// GET /api/v1/stages/{stage_id}/content-blocks
pub async fn list_content_blocks(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(stage_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ContentBlock>>>> {
    ensure_stage_exists(&state, stage_id).await?;
    let blocks = ContentBlockRepo::list_by_stage(&state.pool, stage_id).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// POST /api/v1/stages/{stage_id}/content-blocks
///
/// Without an `order_index` the block goes after the last one in the stage.
pub async fn create_content_block(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(stage_id): Path<DbId>,
    Json(input): Json<CreateContentBlock>,
) -> AppResult<(StatusCode, Json<DataResponse<ContentBlock>>)> {
    let block = validate_new_block(
        input.block_type.as_deref(),
        &input.config,
        &input.content,
        input.order_index.as_ref(),
    )?;

    let created = ContentBlockRepo::create_in_stage(&state.pool, stage_id, &block)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Stage",
            id: stage_id,
        })?;

    tracing::info!(
        block_id = created.id,
        stage_id,
        block_type = %created.block_type,
        order_index = created.order_index,
        user_id = admin.user_id,
        "Content block created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/content-blocks/{id}
pub async fn get_content_block(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ContentBlock>>> {
    let block = ContentBlockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ContentBlock",
            id,
        })?;
    Ok(Json(DataResponse { data: block }))
}

/// PUT|PATCH /api/v1/content-blocks/{id}
///
/// Partial update: `config` and `content` are deep-merged into the stored
/// values and the merged block must pass the completeness check.
pub async fn update_content_block(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContentBlock>,
) -> AppResult<Json<DataResponse<ContentBlock>>> {
    let mut tx = state.pool.begin().await?;

    let current = ContentBlockRepo::lock_for_update(&mut tx, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ContentBlock",
            id,
        })?;

    let plan = match apply_partial_update(&current.to_draft()?, &input.into()) {
        Ok(plan) => plan,
        Err(err) => {
            tracing::warn!(block_id = id, error = %err, "Content block update rejected");
            return Err(err.into());
        }
    };

    let updated = if plan.payload_changed || plan.order_index.is_some() {
        ContentBlockRepo::update_payload(
            &mut tx,
            id,
            &plan.draft.config,
            &plan.draft.content,
            plan.order_index,
        )
        .await?
    } else {
        current
    };
    tx.commit().await?;

    tracing::info!(
        block_id = id,
        payload_changed = plan.payload_changed,
        user_id = admin.user_id,
        "Content block updated"
    );
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/content-blocks/{id}
///
/// Completion records for the block are removed with it.
pub async fn delete_content_block(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ContentBlockRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "ContentBlock",
            id,
        }
        .into());
    }
    tracing::info!(block_id = id, user_id = admin.user_id, "Content block deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/stages/{stage_id}/content-blocks/reorder
///
/// Returns the stage's blocks in their new order.
pub async fn reorder_content_blocks(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(stage_id): Path<DbId>,
    Json(input): Json<ReorderContentBlocks>,
) -> AppResult<Json<DataResponse<Vec<ContentBlock>>>> {
    input.validate()?;
    ensure_stage_exists(&state, stage_id).await?;

    let blocks = ContentBlockRepo::reorder(&state.pool, stage_id, &input.content_blocks).await?;

    tracing::info!(
        stage_id,
        items = input.content_blocks.len(),
        user_id = admin.user_id,
        "Content blocks reordered"
    );
    Ok(Json(DataResponse { data: blocks }))
}
