//! Shared fixtures for hrp-rc integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hrp_common::api::{
    AddStageDocument, DeleteStageDocument, MutationAck, PipelineApi, UpdateStageDates,
    UpdateStageRecruiters,
};
use hrp_common::model::{PipelineState, StageProgress};
use hrp_common::{Error, Result, TransitionPayload};

/// A mutation as received by [`FakeApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Move(TransitionPayload),
    Dates(UpdateStageDates),
    Recruiters(UpdateStageRecruiters),
    AddDocument(AddStageDocument),
    DeleteDocument(DeleteStageDocument),
}

/// In-memory upstream: serves a fixed state, records mutations and applies
/// successful moves so refetches observe them
pub struct FakeApi {
    state: Mutex<PipelineState>,
    calls: Mutex<Vec<Call>>,
    fetches: AtomicUsize,
    /// Mutations answer with this API error instead of succeeding
    fail_mutations: Mutex<Option<(u16, String)>>,
    /// Fetches beyond this many fail with a network error
    fetch_limit: Mutex<Option<usize>>,
}

impl FakeApi {
    pub fn new(state: PipelineState) -> Self {
        Self {
            state: Mutex::new(state),
            calls: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            fail_mutations: Mutex::new(None),
            fetch_limit: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fail_mutations(&self, status: u16, message: &str) {
        *self.fail_mutations.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn limit_fetches(&self, limit: usize) {
        *self.fetch_limit.lock().unwrap() = Some(limit);
    }

    fn mutate(&self, call: Call) -> Result<MutationAck> {
        if let Some((status, message)) = self.fail_mutations.lock().unwrap().clone() {
            return Err(Error::Api { status, message });
        }
        if let Call::Move(payload) = &call {
            self.apply_move(payload);
        }
        self.calls.lock().unwrap().push(call);
        Ok(MutationAck {
            success: Some(true),
            message: None,
        })
    }

    fn apply_move(&self, payload: &TransitionPayload) {
        let Some(next) = payload.next_stage_id.clone() else {
            return;
        };
        let mut state = self.state.lock().unwrap();
        let target = state.candidates.iter_mut().find(|c| {
            Some(&c.user_id) == payload.candidate_id.as_ref()
                || c.pipeline_candidate_id.is_some()
                    && c.pipeline_candidate_id == payload.pipeline_candidate_id
        });
        if let Some(candidate) = target {
            if candidate.progress_for(&next).is_none() {
                candidate.stage_progress.push(StageProgress::new(next.clone(), ""));
            }
            candidate.current_stage_id = next;
        }
    }
}

#[async_trait]
impl PipelineApi for FakeApi {
    async fn fetch_pipeline_state(&self, _job_id: &str) -> Result<PipelineState> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(limit) = *self.fetch_limit.lock().unwrap() {
            if n > limit {
                return Err(Error::Network("connection reset".to_string()));
            }
        }
        Ok(self.state.lock().unwrap().clone())
    }

    async fn move_candidate(&self, payload: &TransitionPayload) -> Result<MutationAck> {
        self.mutate(Call::Move(payload.clone()))
    }

    async fn update_stage_dates(&self, request: &UpdateStageDates) -> Result<MutationAck> {
        self.mutate(Call::Dates(request.clone()))
    }

    async fn update_stage_recruiters(&self, request: &UpdateStageRecruiters) -> Result<MutationAck> {
        self.mutate(Call::Recruiters(request.clone()))
    }

    async fn add_stage_document(&self, request: &AddStageDocument) -> Result<MutationAck> {
        self.mutate(Call::AddDocument(request.clone()))
    }

    async fn delete_stage_document(&self, request: &DeleteStageDocument) -> Result<MutationAck> {
        self.mutate(Call::DeleteDocument(request.clone()))
    }
}

/// Three-stage job:
/// - `u1` in Screening, ready to move
/// - `u2` in Interview, missing a Passport
/// - `u3` in Offer (last stage), ready
/// - `u4` in Screening, stage approved and already reviewed
pub fn job_state() -> PipelineState {
    serde_json::from_value(serde_json::json!({
        "candidates": [
            {
                "userId": "u1", "name": "Ada Lovelace", "email": "ada@example.com",
                "currentStageId": "s1", "skills": ["Rust"],
                "stageProgress": [{
                    "stageId": "s1", "stageName": "Screening",
                    "recruiterInfo": {"_id": "r1", "name": "Rita"},
                    "startDate": "2024-05-01"
                }]
            },
            {
                "userId": "u2", "name": "Grace Hopper", "currentStageId": "s2",
                "stageProgress": [{
                    "stageId": "s2", "stageName": "Interview",
                    "fullStage": {"requiredDocuments": ["Passport"]}
                }]
            },
            {
                "userId": "u3", "name": "Linus", "currentStageId": "s3",
                "stageProgress": [{
                    "stageId": "s3", "stageName": "Offer",
                    "recruiterInfo": {"_id": "r3"},
                    "additionalDocuments": [{"_id": "d1", "documentName": "Visa"}],
                    "uploadedDocuments": [{"documentName": "Visa"}]
                }]
            },
            {
                "userId": "u4", "name": "Barbara", "currentStageId": "s1",
                "stageProgress": [{
                    "stageId": "s1", "stageName": "Screening", "stageStatus": "approved",
                    "recruiterReviews": [{"recruiterId": "r1", "status": "approved"}]
                }]
            }
        ],
        "pipeline": {"_id": "p1", "name": "Engineering", "stages": [
            {"stageId": "s1", "stageName": "Screening", "stageOrder": 1},
            {"stageId": "s2", "stageName": "Interview", "stageOrder": 2},
            {"stageId": "s3", "stageName": "Offer", "stageOrder": 3}
        ]},
        "workOrder": {"_id": "w1", "stages": [
            {"stageId": "s1", "stageOrder": 1},
            {"stageId": "s2", "stageOrder": 2, "assignedRecruiters": ["r5"]},
            {"stageId": "s3", "stageOrder": 3}
        ]}
    }))
    .unwrap()
}
