//! Pipeline board and eligibility endpoints
//!
//! Every request fetches fresh state from the upstream API; nothing is cached
//! between requests.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use hrp_common::board::{Board, BoardQuery};
use hrp_common::{can_move_candidate, Error, StatusReason};

use crate::AppState;

/// GET /api/jobs/:job_id/board?stage=&search=&page=
pub async fn get_board(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<Board>, BoardError> {
    let pipeline_state = state.api.fetch_pipeline_state(&job_id).await?;
    Ok(Json(Board::build(&pipeline_state, &query)))
}

/// Eligibility response for one candidate and stage
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub candidate_id: String,
    pub stage_id: String,
    pub movable: bool,
    pub reason: StatusReason,
    pub message: String,
}

/// GET /api/jobs/:job_id/candidates/:candidate_id/stages/:stage_id/eligibility
pub async fn get_eligibility(
    State(state): State<AppState>,
    Path((job_id, candidate_id, stage_id)): Path<(String, String, String)>,
) -> Result<Json<EligibilityResponse>, BoardError> {
    let pipeline_state = state.api.fetch_pipeline_state(&job_id).await?;
    let candidate = pipeline_state
        .candidate(&candidate_id)
        .ok_or_else(|| BoardError::NotFound(format!("Candidate not found: {}", candidate_id)))?;

    let eligibility = can_move_candidate(candidate, &stage_id);
    Ok(Json(EligibilityResponse {
        candidate_id,
        stage_id,
        movable: eligibility.movable,
        message: eligibility.reason.message(),
        reason: eligibility.reason,
    }))
}

/// Board API errors
#[derive(Debug)]
pub enum BoardError {
    NotFound(String),
    /// Upstream API failed; carries the user-facing message
    Upstream(String),
    Internal(String),
}

impl From<Error> for BoardError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(what) => BoardError::NotFound(what),
            Error::Api { message, .. } => BoardError::Upstream(message),
            Error::Network(msg) | Error::Parse(msg) => BoardError::Upstream(msg),
            other => BoardError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            BoardError::NotFound(what) => (StatusCode::NOT_FOUND, what),
            BoardError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream pipeline API error");
                (StatusCode::BAD_GATEWAY, msg)
            }
            BoardError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
