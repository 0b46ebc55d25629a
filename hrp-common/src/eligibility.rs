//! Stage-exit eligibility
//!
//! Precedence is fixed: progress record, prior approval review, current
//! stage, approval gate, documents. Approval is reported before documents
//! because that is the order a recruiter has to resolve them in.

use serde::Serialize;

use crate::approval::is_stage_approved;
use crate::documents::missing_documents;
use crate::model::{Candidate, ReviewStatus, StageProgress};

/// Why a candidate can or cannot leave a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusReason {
    NoProgressRecord,
    /// A recruiter already approved the move; one-shot, not actionable again
    AlreadyReviewed,
    NotCurrentStage,
    AwaitingApproval,
    AwaitingDocuments { missing: Vec<String> },
    Ready,
}

impl StatusReason {
    /// Recruiter-facing status text
    pub fn message(&self) -> String {
        match self {
            StatusReason::NoProgressRecord => "Candidate has not reached this stage".to_string(),
            StatusReason::AlreadyReviewed => "Ready for next stage".to_string(),
            StatusReason::NotCurrentStage => "Candidate is not in this stage".to_string(),
            StatusReason::AwaitingApproval => "Waiting for stage approval".to_string(),
            StatusReason::AwaitingDocuments { missing } => {
                format!("Waiting for documents: {}", missing.join(", "))
            }
            StatusReason::Ready => "Can be moved to next stage".to_string(),
        }
    }
}

/// Movability decision for one candidate and stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub movable: bool,
    pub reason: StatusReason,
}

impl Eligibility {
    fn blocked(reason: StatusReason) -> Self {
        Self {
            movable: false,
            reason,
        }
    }

    fn ready() -> Self {
        Self {
            movable: true,
            reason: StatusReason::Ready,
        }
    }
}

/// True when any recruiter review for the stage is already approved
pub fn has_approved_review(progress: &StageProgress) -> bool {
    progress
        .recruiter_reviews
        .iter()
        .any(|r| r.status == ReviewStatus::Approved)
}

/// Decide whether `candidate` may be moved out of `stage_id`
pub fn can_move_candidate(candidate: &Candidate, stage_id: &str) -> Eligibility {
    let Some(progress) = candidate.progress_for(stage_id) else {
        return Eligibility::blocked(StatusReason::NoProgressRecord);
    };

    if has_approved_review(progress) {
        return Eligibility::blocked(StatusReason::AlreadyReviewed);
    }

    if stage_id != candidate.current_stage_id {
        return Eligibility::blocked(StatusReason::NotCurrentStage);
    }

    if !is_stage_approved(progress) {
        return Eligibility::blocked(StatusReason::AwaitingApproval);
    }

    let missing = missing_documents(progress);
    if !missing.is_empty() {
        return Eligibility::blocked(StatusReason::AwaitingDocuments { missing });
    }

    Eligibility::ready()
}
