//! Candidates and their pipeline addressing

use serde::{Deserialize, Serialize};

use super::serde_helpers::null_as_default;
use super::stage::StageProgress;

/// A candidate as returned by the pipeline-state endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_stage_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_progress: Vec<StageProgress>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    /// Present only when the candidate was added through a tagged pipeline
    #[serde(default)]
    pub tag_pipeline_id: Option<String>,
    #[serde(default)]
    pub pipeline_candidate_id: Option<String>,
}

/// How mutations must address a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateAddress {
    /// Candidate on the job's default pipeline
    Standard { candidate_id: String },
    /// Candidate added through an ad-hoc (tagged) pipeline
    Tagged {
        tag_pipeline_id: String,
        pipeline_candidate_id: String,
    },
}

impl CandidateAddress {
    pub fn is_tagged(&self) -> bool {
        matches!(self, CandidateAddress::Tagged { .. })
    }
}

impl Candidate {
    /// Progress record for a stage, if the candidate has visited it
    pub fn progress_for(&self, stage_id: &str) -> Option<&StageProgress> {
        self.stage_progress.iter().find(|sp| sp.stage_id == stage_id)
    }

    pub fn current_progress(&self) -> Option<&StageProgress> {
        self.progress_for(&self.current_stage_id)
    }

    /// Resolve mutation addressing. A blank `tagPipelineId` counts as absent;
    /// a tagged candidate without its own pipeline row id falls back to `userId`.
    pub fn address(&self) -> CandidateAddress {
        match self.tag_pipeline_id.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => CandidateAddress::Tagged {
                tag_pipeline_id: tag.to_string(),
                pipeline_candidate_id: self
                    .pipeline_candidate_id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| self.user_id.clone()),
            },
            _ => CandidateAddress::Standard {
                candidate_id: self.user_id.clone(),
            },
        }
    }

    /// Case-insensitive substring match over name, email and skills
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
            || self
                .skills
                .iter()
                .any(|skill| skill.to_lowercase().contains(&needle))
    }
}
