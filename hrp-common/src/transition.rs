//! Move/finish request construction
//!
//! Builds the body of `POST /pipeline/move-candidate`. Preconditions are
//! checked here so nothing invalid reaches the network; the server still
//! re-validates every request.

use serde::Serialize;
use thiserror::Error;

use crate::model::{Candidate, CandidateAddress, PipelineState};

/// Client-side rejection of a transition request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Comments are required")]
    EmptyComments,

    #[error("No reviewer assigned to stage {0}")]
    NoReviewer(String),

    #[error("Stage {0} is not part of the candidate's pipeline")]
    UnknownStage(String),

    #[error("Next stage must differ from the current stage {0}")]
    SameStage(String),

    #[error("No candidate selected")]
    NoCandidateSelected,

    #[error("Stage {0} is the last stage; finish the candidate instead")]
    NoNextStage(String),

    #[error("Stage {0} is not the last stage; choose a next stage instead")]
    NotLastStage(String),
}

/// Body of a move-candidate mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPayload {
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    pub reviewer_id: String,
    pub comments: String,
    pub current_stage_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_stage_order_change: Option<bool>,
    pub is_finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_pipeline_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_candidate_id: Option<String>,
}

/// Recruiter responsible for signing off a stage: the stage's main recruiter,
/// else the first recruiter scheduled for it on the work order
pub fn reviewer_id_for_stage(
    state: &PipelineState,
    candidate: &Candidate,
    stage_id: &str,
) -> Option<String> {
    candidate
        .progress_for(stage_id)
        .and_then(|sp| sp.recruiter_info.as_ref())
        .map(|r| r.id.clone())
        .filter(|id| !id.trim().is_empty())
        .or_else(|| {
            state
                .scheduled_recruiters(stage_id)
                .iter()
                .find(|id| !id.trim().is_empty())
                .cloned()
        })
}

/// Assemble a move (`Some(next)`) or finish (`None`) request
pub fn build_transition_payload(
    state: &PipelineState,
    job_id: &str,
    candidate: &Candidate,
    current_stage_id: &str,
    chosen_next_stage_id: Option<&str>,
    comments: &str,
) -> Result<TransitionPayload, ValidationError> {
    let comments = comments.trim();
    if comments.is_empty() {
        return Err(ValidationError::EmptyComments);
    }

    let reviewer_id = reviewer_id_for_stage(state, candidate, current_stage_id)
        .ok_or_else(|| ValidationError::NoReviewer(current_stage_id.to_string()))?;

    let timeline = state.timeline_for(candidate);
    let address = candidate.address();

    let mut payload = TransitionPayload {
        job_id: job_id.to_string(),
        candidate_id: None,
        reviewer_id,
        comments: comments.to_string(),
        current_stage_id: current_stage_id.to_string(),
        next_stage_id: None,
        is_stage_order_change: None,
        is_finished: false,
        stage_order: None,
        tag_pipeline_id: None,
        pipeline_candidate_id: None,
    };

    match chosen_next_stage_id {
        None => payload.is_finished = true,
        Some(next_id) => {
            if next_id == current_stage_id {
                return Err(ValidationError::SameStage(next_id.to_string()));
            }
            let target = timeline
                .find(next_id)
                .ok_or_else(|| ValidationError::UnknownStage(next_id.to_string()))?;
            let default_next = timeline
                .default_next_stage(current_stage_id)
                .map(|s| s.stage_id.as_str());

            payload.next_stage_id = Some(next_id.to_string());
            payload.is_stage_order_change = Some(default_next != Some(next_id));
            if !address.is_tagged() {
                payload.stage_order = Some(target.stage_order);
            }
        }
    }

    match address {
        CandidateAddress::Standard { candidate_id } => payload.candidate_id = Some(candidate_id),
        CandidateAddress::Tagged {
            tag_pipeline_id,
            pipeline_candidate_id,
        } => {
            payload.tag_pipeline_id = Some(tag_pipeline_id);
            payload.pipeline_candidate_id = Some(pipeline_candidate_id);
        }
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PipelineState {
        serde_json::from_value(serde_json::json!({
            "candidates": [
                {
                    "userId": "u1",
                    "currentStageId": "s1",
                    "stageProgress": [
                        {"stageId": "s1", "recruiterInfo": {"_id": "r1"}},
                        {"stageId": "s3"}
                    ]
                },
                {
                    "userId": "u2",
                    "currentStageId": "t1",
                    "tagPipelineId": "tp",
                    "pipelineCandidateId": "pc2",
                    "stageProgress": [{"stageId": "t1", "recruiterInfo": {"_id": "r2"}}]
                }
            ],
            "pipeline": {"_id": "p1", "stages": [
                {"stageId": "s1", "stageOrder": 1},
                {"stageId": "s2", "stageOrder": 2},
                {"stageId": "s3", "stageOrder": 3}
            ]},
            "workOrder": {"_id": "w1", "stages": [
                {"stageId": "s1", "stageOrder": 1},
                {"stageId": "s2", "stageOrder": 2},
                {"stageId": "s3", "stageOrder": 3, "assignedRecruiters": ["r9"]}
            ]},
            "taggedPipelines": [{"_id": "tp", "stages": [
                {"stageId": "t1", "stageOrder": 1},
                {"stageId": "t2", "stageOrder": 2}
            ]}]
        }))
        .unwrap()
    }

    #[test]
    fn test_move_to_default_successor() {
        let state = state();
        let c = state.candidate("u1").unwrap();
        let p = build_transition_payload(&state, "job1", c, "s1", Some("s2"), "  good fit ").unwrap();

        assert_eq!(p.reviewer_id, "r1");
        assert_eq!(p.comments, "good fit");
        assert_eq!(p.next_stage_id.as_deref(), Some("s2"));
        assert_eq!(p.is_stage_order_change, Some(false));
        assert_eq!(p.stage_order, Some(2));
        assert_eq!(p.candidate_id.as_deref(), Some("u1"));
        assert!(!p.is_finished);
    }

    #[test]
    fn test_skipping_a_stage_is_order_change() {
        let state = state();
        let c = state.candidate("u1").unwrap();
        let p = build_transition_payload(&state, "job1", c, "s1", Some("s3"), "skip").unwrap();
        assert_eq!(p.is_stage_order_change, Some(true));
        assert_eq!(p.stage_order, Some(3));
    }

    #[test]
    fn test_finish_omits_next_stage_key() {
        let state = state();
        let c = state.candidate("u1").unwrap();
        let p = build_transition_payload(&state, "job1", c, "s1", None, "hired").unwrap();
        assert!(p.is_finished);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["isFinished"], true);
        assert!(json.get("nextStageId").is_none());
        assert!(json.get("isStageOrderChange").is_none());
    }

    #[test]
    fn test_blank_comments_rejected() {
        let state = state();
        let c = state.candidate("u1").unwrap();
        let err = build_transition_payload(&state, "job1", c, "s1", None, "   ").unwrap_err();
        assert_eq!(err, ValidationError::EmptyComments);
    }

    #[test]
    fn test_reviewer_falls_back_to_work_order() {
        let state = state();
        let c = state.candidate("u1").unwrap();
        assert_eq!(reviewer_id_for_stage(&state, c, "s3").as_deref(), Some("r9"));

        let err = build_transition_payload(&state, "job1", c, "s2", Some("s3"), "ok").unwrap_err();
        assert_eq!(err, ValidationError::NoReviewer("s2".to_string()));
    }

    #[test]
    fn test_unknown_and_same_stage_rejected() {
        let state = state();
        let c = state.candidate("u1").unwrap();
        assert_eq!(
            build_transition_payload(&state, "job1", c, "s1", Some("nope"), "ok").unwrap_err(),
            ValidationError::UnknownStage("nope".to_string())
        );
        assert_eq!(
            build_transition_payload(&state, "job1", c, "s1", Some("s1"), "ok").unwrap_err(),
            ValidationError::SameStage("s1".to_string())
        );
    }

    #[test]
    fn test_tagged_addressing_omits_stage_order() {
        let state = state();
        let c = state.candidate("u2").unwrap();
        let p = build_transition_payload(&state, "job1", c, "t1", Some("t2"), "ok").unwrap();

        assert_eq!(p.tag_pipeline_id.as_deref(), Some("tp"));
        assert_eq!(p.pipeline_candidate_id.as_deref(), Some("pc2"));
        assert_eq!(p.is_stage_order_change, Some(false));
        assert!(p.stage_order.is_none());
        assert!(p.candidate_id.is_none());

        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("stageOrder").is_none());
        assert_eq!(json["tagPipelineId"], "tp");
    }
}
