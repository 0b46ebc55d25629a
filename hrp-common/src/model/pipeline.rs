//! Pipeline templates, work order timelines and the fetched pipeline state

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::serde_helpers::{flexible_date, null_as_default};

/// One step of a pipeline template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(alias = "_id")]
    pub stage_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_name: String,
    #[serde(default)]
    pub stage_order: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_documents: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stages: Vec<Stage>,
}

/// A stage as scheduled on a job's work order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub stage_id: String,
    #[serde(default)]
    pub stage_name: Option<String>,
    #[serde(default)]
    pub stage_order: u32,
    #[serde(default, deserialize_with = "flexible_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_recruiters: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stages: Vec<TimelineEntry>,
}

impl WorkOrder {
    pub fn entry(&self, stage_id: &str) -> Option<&TimelineEntry> {
        self.stages.iter().find(|e| e.stage_id == stage_id)
    }
}

/// Everything `pipeline-state(jobId)` returns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<Candidate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pipeline: Pipeline,
    #[serde(default)]
    pub work_order: Option<WorkOrder>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tagged_pipelines: Vec<Pipeline>,
}

impl PipelineState {
    pub fn candidate(&self, user_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.user_id == user_id)
    }

    /// Stage ordering that applies to a candidate: its tagged pipeline when
    /// known, else the work order timeline, else the default pipeline.
    pub fn timeline_for(&self, candidate: &Candidate) -> StageTimeline {
        if let Some(tag) = candidate.tag_pipeline_id.as_deref() {
            if let Some(tagged) = self.tagged_pipelines.iter().find(|p| p.id == tag) {
                return StageTimeline::from_pipeline(tagged);
            }
        }
        self.default_timeline()
    }

    /// Timeline of the job's default pipeline path
    pub fn default_timeline(&self) -> StageTimeline {
        match &self.work_order {
            Some(wo) if !wo.stages.is_empty() => StageTimeline::from_work_order(wo, &self.pipeline),
            _ => StageTimeline::from_pipeline(&self.pipeline),
        }
    }

    /// Recruiters scheduled on the work order for a stage
    pub fn scheduled_recruiters(&self, stage_id: &str) -> &[String] {
        self.work_order
            .as_ref()
            .and_then(|wo| wo.entry(stage_id))
            .map(|e| e.assigned_recruiters.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStage {
    pub stage_id: String,
    pub stage_name: String,
    pub stage_order: u32,
}

/// Stages sorted by ascending `stageOrder`
#[derive(Debug, Clone, Default)]
pub struct StageTimeline {
    stages: Vec<TimelineStage>,
}

impl StageTimeline {
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        Self::sorted(
            pipeline
                .stages
                .iter()
                .map(|s| TimelineStage {
                    stage_id: s.stage_id.clone(),
                    stage_name: s.stage_name.clone(),
                    stage_order: s.stage_order,
                })
                .collect(),
        )
    }

    /// Work order entries often omit the stage name; it is then taken from
    /// the pipeline template
    pub fn from_work_order(work_order: &WorkOrder, pipeline: &Pipeline) -> Self {
        Self::sorted(
            work_order
                .stages
                .iter()
                .map(|e| TimelineStage {
                    stage_id: e.stage_id.clone(),
                    stage_name: e
                        .stage_name
                        .clone()
                        .or_else(|| {
                            pipeline
                                .stages
                                .iter()
                                .find(|s| s.stage_id == e.stage_id)
                                .map(|s| s.stage_name.clone())
                        })
                        .unwrap_or_default(),
                    stage_order: e.stage_order,
                })
                .collect(),
        )
    }

    fn sorted(mut stages: Vec<TimelineStage>) -> Self {
        // Stable: equal orders keep their upstream position
        stages.sort_by_key(|s| s.stage_order);
        Self { stages }
    }

    pub fn stages(&self) -> &[TimelineStage] {
        &self.stages
    }

    pub fn find(&self, stage_id: &str) -> Option<&TimelineStage> {
        self.stages.iter().find(|s| s.stage_id == stage_id)
    }

    /// Successor along the default path: smallest `stageOrder` above the
    /// current stage's. `None` for the last stage or an unknown stage.
    pub fn default_next_stage(&self, current_stage_id: &str) -> Option<&TimelineStage> {
        let current = self.find(current_stage_id)?;
        self.stages
            .iter()
            .filter(|s| s.stage_order > current.stage_order)
            .min_by_key(|s| s.stage_order)
    }

    pub fn is_last(&self, stage_id: &str) -> bool {
        self.find(stage_id).is_some() && self.default_next_stage(stage_id).is_none()
    }
}
