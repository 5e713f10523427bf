//! Integration tests for the onboarding repositories.
//!
//! Exercises the repository layer against a real database:
//! - Block creation with and without an explicit order index
//! - Locked read-modify-write of a block payload, including rollback
//! - Reordering and cascade delete
//! - Completion upserts and token renewal compare-and-swap
//! - Lifecycle transitions serialized by the session row lock

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use onramp_core::blocks::catalog;
use onramp_core::blocks::schema::validate_new_block;
use onramp_core::blocks::BlockKind;
use onramp_core::error::CoreError;
use onramp_core::session::{hash_session_token, LearnerStatus, SessionState};
use onramp_core::types::DbId;
use onramp_db::models::content_block::ReorderItem;
use onramp_db::models::learner_session::CreateLearnerSession;
use onramp_db::repositories::{CompletionRepo, ContentBlockRepo, LearnerSessionRepo, StageRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_flow(pool: &PgPool) -> DbId {
    let (id,): (DbId,) =
        sqlx::query_as("INSERT INTO onboarding_flows (name) VALUES ('Welcome') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

async fn seed_stage(pool: &PgPool, flow_id: DbId, name: &str, order_index: i32) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO stages (flow_id, name, order_index) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(flow_id)
    .bind(name)
    .bind(order_index)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

async fn seed_block(pool: &PgPool, stage_id: DbId, kind: BlockKind) -> DbId {
    let d = catalog::descriptor(kind);
    let block =
        validate_new_block(Some(kind.as_str()), &d.default_config, &d.default_content, None)
            .unwrap();
    ContentBlockRepo::create_in_stage(pool, stage_id, &block)
        .await
        .unwrap()
        .unwrap()
        .id
}

fn learner(flow_id: DbId) -> CreateLearnerSession {
    CreateLearnerSession {
        flow_id,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Content blocks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_assigns_next_order_index(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let stage = seed_stage(&pool, flow, "Intro", 1).await;

    let first = seed_block(&pool, stage, BlockKind::Header).await;
    let second = seed_block(&pool, stage, BlockKind::Description).await;

    let blocks = ContentBlockRepo::list_by_stage(&pool, stage).await.unwrap();
    assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![first, second]);
    assert_eq!(blocks[0].order_index, 1);
    assert_eq!(blocks[1].order_index, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_in_missing_stage_returns_none(pool: PgPool) {
    let d = catalog::descriptor(BlockKind::Header);
    let block =
        validate_new_block(Some("header"), &d.default_config, &d.default_content, None).unwrap();
    let created = ContentBlockRepo::create_in_stage(&pool, 9_999, &block).await.unwrap();
    assert!(created.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dropped_transaction_leaves_block_untouched(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let stage = seed_stage(&pool, flow, "Intro", 1).await;
    let id = seed_block(&pool, stage, BlockKind::Header).await;
    let before = ContentBlockRepo::find_by_id(&pool, id).await.unwrap().unwrap();

    {
        let mut tx = pool.begin().await.unwrap();
        let row = ContentBlockRepo::lock_for_update(&mut tx, id).await.unwrap().unwrap();
        ContentBlockRepo::update_payload(&mut tx, row.id, &json!({}), &json!({}), Some(9))
            .await
            .unwrap();
        // Dropped without commit.
    }

    let after = ContentBlockRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(after.config, before.config);
    assert_eq!(after.content, before.content);
    assert_eq!(after.order_index, before.order_index);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn committed_update_keeps_order_when_not_given(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let stage = seed_stage(&pool, flow, "Intro", 1).await;
    let id = seed_block(&pool, stage, BlockKind::Header).await;

    let mut tx = pool.begin().await.unwrap();
    let updated = ContentBlockRepo::update_payload(
        &mut tx,
        id,
        &json!({"label": "Hello"}),
        &json!({"title": "Hi"}),
        None,
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(updated.order_index, 1);
    assert_eq!(updated.content["title"], json!("Hi"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reorder_ignores_foreign_blocks(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let stage = seed_stage(&pool, flow, "Intro", 1).await;
    let other = seed_stage(&pool, flow, "Later", 2).await;
    let a = seed_block(&pool, stage, BlockKind::Header).await;
    let b = seed_block(&pool, stage, BlockKind::Description).await;
    let foreign = seed_block(&pool, other, BlockKind::Caution).await;

    let items = vec![
        ReorderItem { id: a, order_index: 5 },
        ReorderItem { id: b, order_index: 1 },
        ReorderItem { id: foreign, order_index: 3 },
    ];
    let blocks = ContentBlockRepo::reorder(&pool, stage, &items).await.unwrap();
    assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![b, a]);

    let untouched = ContentBlockRepo::find_by_id(&pool, foreign).await.unwrap().unwrap();
    assert_eq!(untouched.order_index, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn flow_listing_follows_stage_order(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let late = seed_stage(&pool, flow, "Later", 2).await;
    let early = seed_stage(&pool, flow, "Intro", 1).await;
    let x = seed_block(&pool, late, BlockKind::Header).await;
    let y = seed_block(&pool, early, BlockKind::Header).await;

    let stages = StageRepo::list_by_flow(&pool, flow).await.unwrap();
    assert_eq!(stages.iter().map(|s| s.id).collect::<Vec<_>>(), vec![early, late]);

    let blocks = ContentBlockRepo::list_by_flow(&pool, flow).await.unwrap();
    assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![y, x]);

    let pairs = StageRepo::list_block_ids_by_flow(&pool, flow).await.unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(StageRepo::find_in_flow(&pool, flow + 1, early).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Completion records and sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_upsert_keeps_started_at(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let stage = seed_stage(&pool, flow, "Intro", 1).await;
    let block = seed_block(&pool, stage, BlockKind::RatingScale).await;
    let session = LearnerSessionRepo::create(&pool, &learner(flow), &hash_session_token("t"), None)
        .await
        .unwrap();

    let first =
        CompletionRepo::upsert_completed(&pool, session.id, stage, block, &json!({"rating": 3}))
            .await
            .unwrap();
    let second =
        CompletionRepo::upsert_completed(&pool, session.id, stage, block, &json!({"rating": 5}))
            .await
            .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.status, "completed");
    assert_eq!(second.started_at, first.started_at);
    assert_eq!(second.data, Some(json!({"rating": 5})));

    let records = CompletionRepo::list_for_session(&pool, session.id).await.unwrap();
    assert_eq!(records.len(), 1);

    ContentBlockRepo::delete(&pool, block).await.unwrap();
    let records = CompletionRepo::list_for_session(&pool, session.id).await.unwrap();
    assert!(records.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn renewal_is_compare_and_swap(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let old_hash = hash_session_token("old");
    let expired = Utc::now() - Duration::days(1);
    let session = LearnerSessionRepo::create(&pool, &learner(flow), &old_hash, Some(expired))
        .await
        .unwrap();

    let renewed_at = Utc::now() + Duration::days(7);
    let first = LearnerSessionRepo::renew_token(
        &pool,
        session.id,
        &old_hash,
        &hash_session_token("new-1"),
        renewed_at,
    )
    .await
    .unwrap();
    assert!(first.is_some());

    let second = LearnerSessionRepo::renew_token(
        &pool,
        session.id,
        &old_hash,
        &hash_session_token("new-2"),
        renewed_at,
    )
    .await
    .unwrap();
    assert!(second.is_none());

    let found = LearnerSessionRepo::find_by_token_hash(&pool, &hash_session_token("new-1"))
        .await
        .unwrap();
    assert_eq!(found.map(|s| s.id), Some(session.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lifecycle_update_round_trips(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let session = LearnerSessionRepo::create(&pool, &learner(flow), &hash_session_token("t"), None)
        .await
        .unwrap();

    let now = Utc::now();
    let state = SessionState {
        status: LearnerStatus::Started,
        expires_at: None,
        started_at: Some(now),
        completed_at: None,
    };
    let mut tx = pool.begin().await.unwrap();
    let locked = LearnerSessionRepo::lock_for_update(&mut tx, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(locked.state().unwrap().status, LearnerStatus::Pending);
    let updated = LearnerSessionRepo::update_lifecycle(&mut tx, session.id, &state)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(updated.state().unwrap().status, LearnerStatus::Started);
    assert!(updated.started_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lifecycle_lock_serializes_transitions(pool: PgPool) {
    let flow = seed_flow(&pool).await;
    let session = LearnerSessionRepo::create(&pool, &learner(flow), &hash_session_token("t"), None)
        .await
        .unwrap();

    // A start reads the row while it is still pending.
    let stale = session.state().unwrap();
    assert_eq!(stale.status, LearnerStatus::Pending);

    // A completion takes the lock first.
    let now = Utc::now();
    let mut first = pool.begin().await.unwrap();
    let current = LearnerSessionRepo::lock_for_update(&mut first, session.id)
        .await
        .unwrap()
        .unwrap()
        .state()
        .unwrap();
    let completed = SessionState {
        status: LearnerStatus::Completed,
        started_at: current.started_at.or(Some(now)),
        completed_at: Some(now),
        ..current
    };

    // The start cannot take the row until the completion commits.
    let mut second = pool.begin().await.unwrap();
    let blocked = tokio::time::timeout(
        std::time::Duration::from_millis(200),
        LearnerSessionRepo::lock_for_update(&mut second, session.id),
    )
    .await;
    assert!(blocked.is_err());
    drop(second);

    LearnerSessionRepo::update_lifecycle(&mut first, session.id, &completed)
        .await
        .unwrap();
    first.commit().await.unwrap();

    // Re-read under the lock, the start sees the committed completion and
    // is refused instead of writing `started` back.
    let mut second = pool.begin().await.unwrap();
    let fresh = LearnerSessionRepo::lock_for_update(&mut second, session.id)
        .await
        .unwrap()
        .unwrap()
        .state()
        .unwrap();
    assert_eq!(fresh.status, LearnerStatus::Completed);
    assert_matches!(
        onramp_core::session::start(&fresh, Utc::now()),
        Err(CoreError::Conflict(_))
    );
    drop(second);

    let stored = LearnerSessionRepo::find_by_token_hash(&pool, &hash_session_token("t"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state().unwrap().status, LearnerStatus::Completed);
}
