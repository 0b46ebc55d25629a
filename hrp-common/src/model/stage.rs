//! Per-candidate stage progress records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers::{flexible_date, null_as_default};

/// Lifecycle status of a candidate's stage instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

/// Status of one recruiter's sign-off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Reference to the server-side approval workflow instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRef {
    #[serde(default)]
    pub approval_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_approved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub levels: Vec<ApprovalLevel>,
}

/// A named group of recruiters whose collective sign-off gates the stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalLevel {
    #[serde(default)]
    pub level_order: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_recruiters: Vec<AssignedRecruiter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedRecruiter {
    #[serde(default, alias = "_id")]
    pub recruiter_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ReviewStatus,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Flat record of an individual recruiter's review of the stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterReview {
    #[serde(default)]
    pub recruiter_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ReviewStatus,
    #[serde(default)]
    pub review_comments: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// The pipeline template stage embedded in a progress record (`fullStage`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    #[serde(default)]
    pub stage_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_documents: Vec<String>,
}

/// Document requirement added to a stage after the fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub document_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl UploadedDocument {
    /// Name used for requirement matching: `documentName`, else `fileName`
    pub fn name(&self) -> Option<&str> {
        self.document_name
            .as_deref()
            .or(self.file_name.as_deref())
    }
}

/// Main recruiter assigned to the stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterInfo {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A candidate's record of activity within one stage instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    pub stage_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_status: StageStatus,
    #[serde(default)]
    pub approval: Option<ApprovalRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approval_details: ApprovalDetails,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recruiter_reviews: Vec<RecruiterReview>,
    #[serde(default)]
    pub full_stage: Option<StageDefinition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_documents: Vec<AdditionalDocument>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uploaded_documents: Vec<UploadedDocument>,
    #[serde(default)]
    pub recruiter_info: Option<RecruiterInfo>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub end_date: Option<NaiveDate>,
}

impl StageProgress {
    /// Empty progress record for a stage, mostly useful in tests
    pub fn new(stage_id: impl Into<String>, stage_name: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            stage_name: stage_name.into(),
            stage_status: StageStatus::Pending,
            approval: None,
            approval_details: ApprovalDetails::default(),
            recruiter_reviews: Vec::new(),
            full_stage: None,
            additional_documents: Vec::new(),
            uploaded_documents: Vec::new(),
            recruiter_info: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.stage_status == StageStatus::Approved
    }

    /// Base document requirements from the pipeline template
    pub fn base_requirements(&self) -> &[String] {
        self.full_stage
            .as_ref()
            .map(|s| s.required_documents.as_slice())
            .unwrap_or(&[])
    }

    pub fn additional_document(&self, document_id: &str) -> Option<&AdditionalDocument> {
        self.additional_documents.iter().find(|d| d.id == document_id)
    }
}
