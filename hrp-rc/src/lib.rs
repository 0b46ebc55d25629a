//! hrp-rc library - Recruiter Console
//!
//! Session store driving candidate moves and stage edits, plus a read-only
//! board service over the upstream pipeline API.

use std::sync::Arc;

use axum::Router;
use hrp_common::api::PipelineApi;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod logging;
pub mod session;

pub use session::{PendingEdit, PipelineSession, Selection};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream pipeline API
    pub api: Arc<dyn PipelineApi>,
}

impl AppState {
    pub fn new(api: Arc<dyn PipelineApi>) -> Self {
        Self { api }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/jobs/:job_id/board", get(api::get_board))
        .route(
            "/api/jobs/:job_id/candidates/:candidate_id/stages/:stage_id/eligibility",
            get(api::get_eligibility),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
