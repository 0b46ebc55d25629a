//! Request/response bodies for the upstream pipeline API
//!
//! Path parameters are carried on the request structs but skipped during
//! serialization; only the JSON body fields are sent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::PipelineState;
use crate::{Error, Result};

/// Shown when a failed response carries no usable message
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// `POST /jobs/{jobId}/stages/{stageId}/dates`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStageDates {
    #[serde(skip)]
    pub job_id: String,
    #[serde(skip)]
    pub stage_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// `POST /jobs/{jobId}/stages/{stageId}/recruiters`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStageRecruiters {
    #[serde(skip)]
    pub job_id: String,
    #[serde(skip)]
    pub stage_id: String,
    pub recruiter_ids: Vec<String>,
}

/// `POST /jobs/{jobId}/stages/{stageId}/documents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStageDocument {
    #[serde(skip)]
    pub job_id: String,
    #[serde(skip)]
    pub stage_id: String,
    pub document_name: String,
}

/// `POST /jobs/{jobId}/documents/{documentId}/delete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStageDocument {
    #[serde(skip)]
    pub job_id: String,
    #[serde(skip)]
    pub document_id: String,
}

/// Acknowledgement body of a mutation; an empty body counts as success
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MutationAck {
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

/// Decode a `pipeline-state` body, which arrives either bare or inside
/// `{ "data": ... }`. A present `data` key is authoritative: a malformed
/// payload inside it is a parse error, never an empty state.
pub(crate) fn parse_pipeline_state(body: &str) -> Result<PipelineState> {
    let mut value: Value = serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;
    let inner = match value.get_mut("data") {
        Some(data) => data.take(),
        None => value,
    };
    serde_json::from_value(inner).map_err(|e| Error::Parse(e.to_string()))
}

/// Decode a 2xx mutation body. The write already happened, so a body that
/// is empty or not a JSON ack counts as success; only an explicit
/// `success: false` reports failure.
pub(crate) fn parse_mutation_ack(body: &str) -> MutationAck {
    if body.trim().is_empty() {
        return MutationAck::default();
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Mutation acknowledged with a non-JSON body");
        MutationAck::default()
    })
}

/// Pull a user-facing message out of an error body: `data.message`, then
/// `message`, then the generic fallback
pub fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };

    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    non_empty(value.pointer("/data/message"))
        .or_else(|| non_empty(value.get("message")))
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}
