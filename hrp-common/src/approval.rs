//! Multi-level approval status

use serde::Serialize;

use crate::model::{ReviewStatus, StageProgress};

/// Display aggregate for one approval level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub level_order: u32,
    pub level_name: String,
    pub approved_count: usize,
    pub total_count: usize,
    /// Every assigned recruiter has approved
    pub complete: bool,
}

/// A stage is approval-gated iff it has at least one approval level
pub fn is_approval_gated(progress: &StageProgress) -> bool {
    !progress.approval_details.levels.is_empty()
}

/// Ungated stages are always approved; gated ones need `approval.isApproved`
pub fn is_stage_approved(progress: &StageProgress) -> bool {
    if !is_approval_gated(progress) {
        return true;
    }
    progress
        .approval
        .as_ref()
        .map(|a| a.is_approved)
        .unwrap_or(false)
}

/// Per-level sign-off counts, ordered by `levelOrder`
pub fn level_progress(progress: &StageProgress) -> Vec<LevelProgress> {
    let mut levels: Vec<LevelProgress> = progress
        .approval_details
        .levels
        .iter()
        .map(|level| {
            let total_count = level.assigned_recruiters.len();
            let approved_count = level
                .assigned_recruiters
                .iter()
                .filter(|r| r.status == ReviewStatus::Approved)
                .count();
            LevelProgress {
                level_order: level.level_order,
                level_name: level.level_name.clone(),
                approved_count,
                total_count,
                complete: approved_count == total_count,
            }
        })
        .collect();
    levels.sort_by_key(|l| l.level_order);
    levels
}
