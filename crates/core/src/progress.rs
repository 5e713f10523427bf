//! Learner progress derived from completion records.
//!
//! Nothing computed here is stored. Stage completion, the current stage and
//! the overall percentage are recomputed from the flow's stages and the
//! learner's completion records on every read.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Completion status
// ---------------------------------------------------------------------------

/// Status of one (learner, block) completion record. A block with no record
/// is `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl CompletionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Parse the database representation. Unknown values read as `Pending`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One stage of a flow and the ids of the blocks it contains.
#[derive(Debug, Clone)]
pub struct StageBlocks {
    pub stage_id: DbId,
    pub name: String,
    pub order_index: i32,
    pub block_ids: Vec<DbId>,
}

/// Reduce (block id, status) pairs to the set of completed block ids.
pub fn completed_blocks<I>(records: I) -> HashSet<DbId>
where
    I: IntoIterator<Item = (DbId, CompletionStatus)>,
{
    records
        .into_iter()
        .filter(|(_, status)| *status == CompletionStatus::Completed)
        .map(|(block_id, _)| block_id)
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageProgress {
    pub stage_id: DbId,
    pub name: String,
    pub order_index: i32,
    pub total_blocks: usize,
    pub completed_blocks: usize,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub stages: Vec<StageProgress>,
    pub current_stage_id: Option<DbId>,
    pub completed_count: usize,
    pub total_count: usize,
    pub percentage: f64,
}

impl ProgressSnapshot {
    /// Every stage is complete (vacuously true for an empty flow).
    pub fn all_complete(&self) -> bool {
        self.current_stage_id.is_none()
    }

    pub fn stage(&self, stage_id: DbId) -> Option<&StageProgress> {
        self.stages.iter().find(|s| s.stage_id == stage_id)
    }

    pub fn current_stage(&self) -> Option<&StageProgress> {
        self.current_stage_id.and_then(|id| self.stage(id))
    }

    /// Unknown stages read as incomplete.
    pub fn is_stage_complete(&self, stage_id: DbId) -> bool {
        self.stage(stage_id).is_some_and(|s| s.is_complete)
    }
}

/// Compute progress for one learner.
///
/// Stages are taken in `order_index` order (ties broken by id). A stage with
/// no blocks is complete.
pub fn compute_progress(stages: &[StageBlocks], completed: &HashSet<DbId>) -> ProgressSnapshot {
    let mut ordered: Vec<&StageBlocks> = stages.iter().collect();
    ordered.sort_by_key(|s| (s.order_index, s.stage_id));

    let stages: Vec<StageProgress> = ordered
        .into_iter()
        .map(|stage| {
            let done = stage
                .block_ids
                .iter()
                .filter(|id| completed.contains(*id))
                .count();
            StageProgress {
                stage_id: stage.stage_id,
                name: stage.name.clone(),
                order_index: stage.order_index,
                total_blocks: stage.block_ids.len(),
                completed_blocks: done,
                is_complete: done == stage.block_ids.len(),
            }
        })
        .collect();

    let completed_count = stages.iter().filter(|s| s.is_complete).count();
    let total_count = stages.len();
    let percentage = if total_count == 0 {
        0.0
    } else {
        completed_count as f64 / total_count as f64 * 100.0
    };
    let current_stage_id = stages.iter().find(|s| !s.is_complete).map(|s| s.stage_id);

    ProgressSnapshot {
        stages,
        current_stage_id,
        completed_count,
        total_count,
        percentage,
    }
}

/// Group `(stage_id, block_id)` rows into per-stage block lists.
pub fn group_blocks<I>(rows: I) -> HashMap<DbId, Vec<DbId>>
where
    I: IntoIterator<Item = (DbId, DbId)>,
{
    let mut grouped: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for (stage_id, block_id) in rows {
        grouped.entry(stage_id).or_default().push(block_id);
    }
    grouped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: DbId, order: i32, blocks: &[DbId]) -> StageBlocks {
        StageBlocks {
            stage_id: id,
            name: format!("Stage {id}"),
            order_index: order,
            block_ids: blocks.to_vec(),
        }
    }

    #[test]
    fn empty_stage_is_complete_and_current_is_first_incomplete() {
        let stages = vec![stage(1, 1, &[]), stage(2, 2, &[10])];

        let snapshot = compute_progress(&stages, &HashSet::new());
        assert_eq!(snapshot.current_stage_id, Some(2));
        assert_eq!(snapshot.completed_count, 1);
        assert_eq!(snapshot.percentage, 50.0);
        assert!(!snapshot.all_complete());

        let done = completed_blocks([(10, CompletionStatus::Completed)]);
        let snapshot = compute_progress(&stages, &done);
        assert_eq!(snapshot.current_stage_id, None);
        assert_eq!(snapshot.percentage, 100.0);
        assert!(snapshot.all_complete());
    }

    #[test]
    fn no_stages_is_zero_percent_not_an_error() {
        let snapshot = compute_progress(&[], &HashSet::new());
        assert_eq!(snapshot.total_count, 0);
        assert_eq!(snapshot.percentage, 0.0);
        assert_eq!(snapshot.current_stage_id, None);
    }

    #[test]
    fn only_completed_records_count() {
        let done = completed_blocks([
            (1, CompletionStatus::InProgress),
            (2, CompletionStatus::Pending),
            (3, CompletionStatus::Completed),
        ]);
        assert_eq!(done, HashSet::from([3]));

        let snapshot = compute_progress(&[stage(7, 1, &[1, 3])], &done);
        assert_eq!(snapshot.stages[0].completed_blocks, 1);
        assert!(!snapshot.is_stage_complete(7));
    }

    #[test]
    fn stages_are_ordered_by_index_then_id() {
        let stages = vec![stage(5, 2, &[50]), stage(9, 1, &[90]), stage(3, 1, &[30])];
        let snapshot = compute_progress(&stages, &HashSet::new());
        let order: Vec<_> = snapshot.stages.iter().map(|s| s.stage_id).collect();
        assert_eq!(order, vec![3, 9, 5]);
        assert_eq!(snapshot.current_stage().map(|s| s.stage_id), Some(3));
    }

    #[test]
    fn recomputing_without_writes_is_stable() {
        let stages = vec![stage(1, 1, &[1, 2]), stage(2, 2, &[3])];
        let done = completed_blocks([
            (1, CompletionStatus::Completed),
            (2, CompletionStatus::Completed),
        ]);
        assert_eq!(compute_progress(&stages, &done), compute_progress(&stages, &done));
    }

    #[test]
    fn later_stage_may_be_complete_before_current() {
        let stages = vec![stage(1, 1, &[1]), stage(2, 2, &[2])];
        let done = completed_blocks([(2, CompletionStatus::Completed)]);
        let snapshot = compute_progress(&stages, &done);
        assert_eq!(snapshot.current_stage_id, Some(1));
        assert_eq!(snapshot.completed_count, 1);
    }

    #[test]
    fn grouping_rows_by_stage() {
        let grouped = group_blocks([(1, 10), (2, 20), (1, 11)]);
        assert_eq!(grouped[&1], vec![10, 11]);
        assert_eq!(grouped[&2], vec![20]);
    }

    #[test]
    fn status_db_round_trip() {
        for status in [
            CompletionStatus::Pending,
            CompletionStatus::InProgress,
            CompletionStatus::Completed,
        ] {
            assert_eq!(CompletionStatus::from_db(status.as_str()), status);
        }
        assert_eq!(CompletionStatus::from_db("bogus"), CompletionStatus::Pending);
    }
}
