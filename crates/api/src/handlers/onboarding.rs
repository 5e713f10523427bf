//! Handlers for the learner-facing `/onboarding/{token}` resource.
//!
//! Learners authenticate with the session token in the path. Every read of
//! progress is recomputed from the flow's stages and the learner's
//! completion records; nothing derived is stored.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::Utc;
use onramp_core::error::CoreError;
use onramp_core::input::validate_user_input;
use onramp_core::progress::{
    compute_progress, completed_blocks, group_blocks, CompletionStatus, ProgressSnapshot,
    StageBlocks, StageProgress,
};
use onramp_core::session::{
    self, describe_access, hash_session_token, AccessReport, LearnerStatus,
};
use onramp_core::storage::learner_upload_path;
use onramp_core::types::{DbId, JsonMap, Timestamp};
use onramp_db::models::completion::{BlockWithProgress, CompletionRecord};
use onramp_db::models::content_block::ContentBlock;
use onramp_db::models::learner_session::LearnerSession;
use onramp_db::models::stage::Stage;
use onramp_db::repositories::{CompletionRepo, ContentBlockRepo, LearnerSessionRepo, StageRepo};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Session and progress loading
// ---------------------------------------------------------------------------

async fn load_session(state: &AppState, token: &str) -> AppResult<LearnerSession> {
    let learner = LearnerSessionRepo::find_by_token_hash(&state.pool, &hash_session_token(token))
        .await?
        .ok_or(CoreError::SessionNotFound)?;
    Ok(learner)
}

/// Look the session up and run the access gate on it.
async fn open_session(state: &AppState, token: &str) -> AppResult<LearnerSession> {
    let learner = load_session(state, token).await?;
    session::check_access(&learner.state()?, Utc::now())?;
    Ok(learner)
}

/// Everything progress is derived from, plus the derived snapshot.
struct FlowProgress {
    stages: Vec<Stage>,
    records: Vec<CompletionRecord>,
    snapshot: ProgressSnapshot,
}

async fn load_progress(state: &AppState, learner: &LearnerSession) -> AppResult<FlowProgress> {
    let stages = StageRepo::list_by_flow(&state.pool, learner.flow_id).await?;
    let pairs = StageRepo::list_block_ids_by_flow(&state.pool, learner.flow_id).await?;
    let records = CompletionRepo::list_for_session(&state.pool, learner.id).await?;

    let mut grouped = group_blocks(pairs.iter().map(|p| (p.stage_id, p.content_block_id)));
    let inputs: Vec<StageBlocks> = stages
        .iter()
        .map(|stage| StageBlocks {
            stage_id: stage.id,
            name: stage.name.clone(),
            order_index: stage.order_index,
            block_ids: grouped.remove(&stage.id).unwrap_or_default(),
        })
        .collect();
    let completed = completed_blocks(
        records
            .iter()
            .map(|r| (r.content_block_id, r.completion_status())),
    );
    let snapshot = compute_progress(&inputs, &completed);

    Ok(FlowProgress {
        stages,
        records,
        snapshot,
    })
}

async fn find_stage(
    state: &AppState,
    learner: &LearnerSession,
    stage_id: DbId,
) -> AppResult<Stage> {
    let stage = StageRepo::find_in_flow(&state.pool, learner.flow_id, stage_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Stage",
            id: stage_id,
        })?;
    Ok(stage)
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StageSummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i32,
}

impl From<&Stage> for StageSummary {
    fn from(stage: &Stage) -> Self {
        Self {
            id: stage.id,
            name: stage.name.clone(),
            description: stage.description.clone(),
            order_index: stage.order_index,
        }
    }
}

/// A stage with its blocks as the learner sees them.
#[derive(Debug, Serialize)]
pub struct StageView {
    #[serde(flatten)]
    pub stage: StageSummary,
    pub is_complete: bool,
    pub content_blocks: Vec<BlockWithProgress>,
}

/// The whole flow for one learner.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub learner_session_id: DbId,
    pub flow_id: DbId,
    pub learner_name: String,
    pub learner_email: String,
    pub status: LearnerStatus,
    pub current_stage_id: Option<DbId>,
    pub progress_percentage: f64,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub stages: Vec<StageView>,
}

#[derive(Debug, Serialize)]
pub struct ProgressOverview {
    pub learner_session_id: DbId,
    pub flow_id: DbId,
    pub total_stages: usize,
    pub completed_stages: usize,
    pub current_stage_id: Option<DbId>,
    pub current_stage_name: Option<String>,
    pub overall_progress_percentage: f64,
    pub started_at: Option<Timestamp>,
    pub stages: Vec<StageProgress>,
}

/// Pair blocks with this learner's records, keyed by stage.
fn blocks_with_progress(
    blocks: Vec<ContentBlock>,
    records: &[CompletionRecord],
) -> HashMap<DbId, Vec<BlockWithProgress>> {
    let by_block: HashMap<DbId, &CompletionRecord> =
        records.iter().map(|r| (r.content_block_id, r)).collect();
    let mut grouped: HashMap<DbId, Vec<BlockWithProgress>> = HashMap::new();
    for block in blocks {
        let record = by_block.get(&block.id).copied();
        grouped
            .entry(block.stage_id)
            .or_default()
            .push(BlockWithProgress::new(block, record));
    }
    grouped
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/onboarding/{token}
pub async fn get_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let learner = open_session(&state, &token).await?;
    let progress = load_progress(&state, &learner).await?;
    let blocks = ContentBlockRepo::list_by_flow(&state.pool, learner.flow_id).await?;
    let mut grouped = blocks_with_progress(blocks, &progress.records);

    let stages = progress
        .stages
        .iter()
        .map(|stage| StageView {
            stage: StageSummary::from(stage),
            is_complete: progress.snapshot.is_stage_complete(stage.id),
            content_blocks: grouped.remove(&stage.id).unwrap_or_default(),
        })
        .collect();

    let learner_state = learner.state()?;
    Ok(Json(DataResponse {
        data: SessionView {
            learner_session_id: learner.id,
            flow_id: learner.flow_id,
            learner_name: learner.full_name(),
            learner_email: learner.email.clone(),
            status: learner_state.status,
            current_stage_id: progress.snapshot.current_stage_id,
            progress_percentage: progress.snapshot.percentage,
            started_at: learner.started_at,
            completed_at: learner.completed_at,
            expires_at: learner.session_token_expires_at,
            stages,
        },
    }))
}

/// GET /api/v1/onboarding/{token}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<ProgressOverview>>> {
    let learner = open_session(&state, &token).await?;
    let FlowProgress { snapshot, .. } = load_progress(&state, &learner).await?;

    let current_stage_name = snapshot.current_stage().map(|s| s.name.clone());
    Ok(Json(DataResponse {
        data: ProgressOverview {
            learner_session_id: learner.id,
            flow_id: learner.flow_id,
            total_stages: snapshot.total_count,
            completed_stages: snapshot.completed_count,
            current_stage_id: snapshot.current_stage_id,
            current_stage_name,
            overall_progress_percentage: snapshot.percentage,
            started_at: learner.started_at,
            stages: snapshot.stages,
        },
    }))
}

/// GET /api/v1/onboarding/{token}/current-stage
///
/// `data` is `null` once every stage is complete.
pub async fn get_current_stage(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<Option<StageSummary>>>> {
    let learner = open_session(&state, &token).await?;
    let progress = load_progress(&state, &learner).await?;

    let current = progress
        .snapshot
        .current_stage_id
        .and_then(|id| progress.stages.iter().find(|s| s.id == id))
        .map(StageSummary::from);
    Ok(Json(DataResponse { data: current }))
}

/// GET /api/v1/onboarding/{token}/stages/{stage_id}
pub async fn get_stage(
    State(state): State<AppState>,
    Path((token, stage_id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<StageView>>> {
    let learner = open_session(&state, &token).await?;
    let stage = find_stage(&state, &learner, stage_id).await?;
    let progress = load_progress(&state, &learner).await?;
    let blocks = ContentBlockRepo::list_by_stage(&state.pool, stage.id).await?;
    let mut grouped = blocks_with_progress(blocks, &progress.records);

    Ok(Json(DataResponse {
        data: StageView {
            is_complete: progress.snapshot.is_stage_complete(stage.id),
            content_blocks: grouped.remove(&stage.id).unwrap_or_default(),
            stage: StageSummary::from(&stage),
        },
    }))
}

/// GET /api/v1/onboarding/{token}/stages/{stage_id}/status
pub async fn get_stage_status(
    State(state): State<AppState>,
    Path((token, stage_id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<StageProgress>>> {
    let learner = open_session(&state, &token).await?;
    let stage = find_stage(&state, &learner, stage_id).await?;
    let progress = load_progress(&state, &learner).await?;

    let status = progress
        .snapshot
        .stage(stage.id)
        .cloned()
        .ok_or_else(|| CoreError::Internal(format!("Stage {} missing from progress", stage.id)))?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/onboarding/{token}/validate
///
/// Reports expiry and denial in the body instead of failing, so a client can
/// decide whether to offer renewal.
pub async fn validate_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<AccessReport>> {
    let learner = load_session(&state, &token).await?;
    Ok(Json(describe_access(&learner.state()?, Utc::now())))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LifecycleState {
    pub status: LearnerStatus,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Re-read the session under a row lock so the transition is planned from
/// the status a concurrent start or complete committed.
async fn lock_session(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: DbId,
) -> AppResult<LearnerSession> {
    let locked = LearnerSessionRepo::lock_for_update(tx, id)
        .await?
        .ok_or(CoreError::SessionNotFound)?;
    Ok(locked)
}

/// POST /api/v1/onboarding/{token}/start
pub async fn start_onboarding(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<MessageResponse<LifecycleState>>> {
    let learner = load_session(&state, &token).await?;
    let mut tx = state.pool.begin().await?;
    let locked = lock_session(&mut tx, learner.id).await?;

    let now = Utc::now();
    let current = locked.state()?;
    session::check_not_expired(&current, now)?;
    let next = session::start(&current, now)?;

    LearnerSessionRepo::update_lifecycle(&mut tx, locked.id, &next).await?;
    tx.commit().await?;

    tracing::info!(session_id = locked.id, "Onboarding started");
    Ok(Json(MessageResponse {
        message: "Onboarding started successfully",
        data: LifecycleState {
            status: next.status,
            started_at: next.started_at,
            completed_at: next.completed_at,
        },
    }))
}

/// POST /api/v1/onboarding/{token}/complete
///
/// Allowed only once every stage is complete.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<MessageResponse<LifecycleState>>> {
    let learner = load_session(&state, &token).await?;
    let mut tx = state.pool.begin().await?;
    let locked = lock_session(&mut tx, learner.id).await?;

    let now = Utc::now();
    let current = locked.state()?;
    session::check_not_expired(&current, now)?;

    let progress = load_progress(&state, &locked).await?;
    let next = session::complete(&current, &progress.snapshot, now)?;

    LearnerSessionRepo::update_lifecycle(&mut tx, locked.id, &next).await?;
    tx.commit().await?;

    tracing::info!(session_id = locked.id, "Onboarding completed");
    Ok(Json(MessageResponse {
        message: "Onboarding completed successfully",
        data: LifecycleState {
            status: next.status,
            started_at: next.started_at,
            completed_at: next.completed_at,
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct RenewedToken {
    pub new_session_token: String,
    pub expires_at: Timestamp,
    pub message: &'static str,
}

/// POST /api/v1/onboarding/{token}/renew
///
/// Only an expired token can be renewed. The old token stops working.
pub async fn renew_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<RenewedToken>> {
    let learner = load_session(&state, &token).await?;
    let issued = session::plan_renewal(
        &learner.state()?,
        Utc::now(),
        state.config.session_token_ttl(),
    )?;

    LearnerSessionRepo::renew_token(
        &state.pool,
        learner.id,
        &learner.session_token_hash,
        &issued.token_hash,
        issued.expires_at,
    )
    .await?
    .ok_or_else(|| CoreError::Conflict("Session token was already renewed".to_string()))?;

    tracing::info!(
        session_id = learner.id,
        expires_at = %issued.expires_at,
        "Session token renewed"
    );
    Ok(Json(RenewedToken {
        new_session_token: issued.token,
        expires_at: issued.expires_at,
        message: "Session token renewed successfully",
    }))
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct BlockCompletion {
    pub content_block_id: DbId,
    pub status: CompletionStatus,
    pub data: Value,
    pub completed_at: Option<Timestamp>,
}

/// POST /api/v1/onboarding/{token}/stages/{stage_id}/content-blocks/{block_id}/complete
///
/// Body: `{"data": {...}}`. The submission is validated against the block's
/// type, config and content; every violation is reported together.
pub async fn complete_content_block(
    State(state): State<AppState>,
    Path((token, stage_id, block_id)): Path<(String, DbId, DbId)>,
    Json(submission): Json<Value>,
) -> AppResult<Json<MessageResponse<BlockCompletion>>> {
    let learner = open_session(&state, &token).await?;
    let stage = find_stage(&state, &learner, stage_id).await?;
    let block = ContentBlockRepo::find_by_id(&state.pool, block_id)
        .await?
        .filter(|b| b.stage_id == stage.id)
        .ok_or(CoreError::NotFound {
            entity: "ContentBlock",
            id: block_id,
        })?;

    let report = validate_user_input(&block.block_type, &block.config, &block.content, &submission);
    if !report.valid {
        tracing::info!(
            session_id = learner.id,
            block_id,
            errors = report.errors.len(),
            "Submission rejected"
        );
    }
    report.into_result()?;

    let data = submission
        .get("data")
        .filter(|d| d.is_object())
        .cloned()
        .unwrap_or_else(|| Value::Object(JsonMap::new()));
    let record =
        CompletionRepo::upsert_completed(&state.pool, learner.id, stage.id, block.id, &data)
            .await?;

    tracing::info!(
        session_id = learner.id,
        stage_id = stage.id,
        block_id = block.id,
        "Submission recorded"
    );
    Ok(Json(MessageResponse {
        message: "Content block completed successfully",
        data: BlockCompletion {
            content_block_id: block.id,
            status: record.completion_status(),
            data,
            completed_at: record.completed_at,
        },
    }))
}

/// POST /api/v1/onboarding/{token}/stages/{stage_id}/complete
///
/// Succeeds only if the stage is already complete by its blocks. Nothing is
/// stored; stage completion is always derived.
pub async fn complete_stage(
    State(state): State<AppState>,
    Path((token, stage_id)): Path<(String, DbId)>,
) -> AppResult<Json<MessageResponse<StageProgress>>> {
    let learner = open_session(&state, &token).await?;
    let stage = find_stage(&state, &learner, stage_id).await?;
    let progress = load_progress(&state, &learner).await?;

    let status = progress
        .snapshot
        .stage(stage.id)
        .filter(|s| s.is_complete)
        .cloned()
        .ok_or_else(|| {
            CoreError::Validation(
                "Stage is not complete. All content blocks must be finished.".to_string(),
            )
        })?;
    Ok(Json(MessageResponse {
        message: "Stage completed successfully",
        data: status,
    }))
}

#[derive(Debug, Serialize)]
pub struct StoredUpload {
    pub file_url: String,
    pub file_name: String,
    pub file_size: usize,
}

/// POST /api/v1/onboarding/{token}/uploads
///
/// Multipart with a single `file` field. The size ceiling is enforced while
/// reading, so an oversized upload is never fully buffered.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(token): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<MessageResponse<StoredUpload>>> {
    let learner = open_session(&state, &token).await?;
    let max_bytes = state.config.max_upload_bytes;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::BadRequest(format!(
                    "File exceeds the maximum upload size of {max_bytes} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        let path = learner_upload_path(learner.id, &file_name);
        let file_url = state.storage.upload(&bytes, &path).await?;

        tracing::info!(
            session_id = learner.id,
            path = %path,
            size = bytes.len(),
            "Upload stored"
        );
        return Ok(Json(MessageResponse {
            message: "File uploaded successfully",
            data: StoredUpload {
                file_url,
                file_name,
                file_size: bytes.len(),
            },
        }));
    }

    Err(AppError::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}
