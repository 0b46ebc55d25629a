//! Pipeline API client
//!
//! Thin typed wrapper over the upstream REST endpoints. No retries: every
//! failure is surfaced to the caller, who decides whether to resubmit.

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Serialize;
use std::time::Duration;

use super::types::{
    extract_error_message, parse_mutation_ack, parse_pipeline_state, AddStageDocument,
    DeleteStageDocument, MutationAck, UpdateStageDates, UpdateStageRecruiters, GENERIC_ERROR_MESSAGE,
};
use crate::config::ApiConfig;
use crate::model::PipelineState;
use crate::transition::TransitionPayload;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("hrp/", env!("CARGO_PKG_VERSION"));

/// Operations the pipeline core needs from the upstream API
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// `GET /jobs/{jobId}/pipeline-state`
    async fn fetch_pipeline_state(&self, job_id: &str) -> Result<PipelineState>;

    /// `POST /pipeline/move-candidate`
    async fn move_candidate(&self, payload: &TransitionPayload) -> Result<MutationAck>;

    async fn update_stage_dates(&self, request: &UpdateStageDates) -> Result<MutationAck>;

    async fn update_stage_recruiters(&self, request: &UpdateStageRecruiters) -> Result<MutationAck>;

    async fn add_stage_document(&self, request: &AddStageDocument) -> Result<MutationAck>;

    async fn delete_stage_document(&self, request: &DeleteStageDocument) -> Result<MutationAck>;
}

/// reqwest-backed [`PipelineApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL {}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API base URL cannot carry paths: {}",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            let message = extract_error_message(&body);
            tracing::warn!(status = status.as_u16(), message = %message, "Pipeline API request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<MutationAck> {
        let url = self.url(segments);
        tracing::debug!(url = %url, "POST pipeline mutation");

        let body = self.send(self.request(Method::POST, url).json(body)).await?;
        let ack = parse_mutation_ack(&body);

        if !ack.is_success() {
            let message = ack
                .message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            return Err(Error::Api {
                status: 200,
                message,
            });
        }

        Ok(ack)
    }
}

#[async_trait]
impl PipelineApi for ApiClient {
    async fn fetch_pipeline_state(&self, job_id: &str) -> Result<PipelineState> {
        let url = self.url(&["jobs", job_id, "pipeline-state"]);
        tracing::debug!(job_id = %job_id, url = %url, "Fetching pipeline state");

        let body = self.send(self.request(Method::GET, url)).await?;
        let state = parse_pipeline_state(&body)?;

        tracing::info!(
            job_id = %job_id,
            candidates = state.candidates.len(),
            stages = state.pipeline.stages.len(),
            "Retrieved pipeline state"
        );

        Ok(state)
    }

    async fn move_candidate(&self, payload: &TransitionPayload) -> Result<MutationAck> {
        tracing::info!(
            job_id = %payload.job_id,
            current_stage = %payload.current_stage_id,
            next_stage = ?payload.next_stage_id,
            finished = payload.is_finished,
            "Submitting candidate move"
        );
        self.post(&["pipeline", "move-candidate"], payload).await
    }

    async fn update_stage_dates(&self, request: &UpdateStageDates) -> Result<MutationAck> {
        self.post(
            &["jobs", request.job_id.as_str(), "stages", request.stage_id.as_str(), "dates"],
            request,
        )
        .await
    }

    async fn update_stage_recruiters(&self, request: &UpdateStageRecruiters) -> Result<MutationAck> {
        self.post(
            &["jobs", request.job_id.as_str(), "stages", request.stage_id.as_str(), "recruiters"],
            request,
        )
        .await
    }

    async fn add_stage_document(&self, request: &AddStageDocument) -> Result<MutationAck> {
        self.post(
            &["jobs", request.job_id.as_str(), "stages", request.stage_id.as_str(), "documents"],
            request,
        )
        .await
    }

    async fn delete_stage_document(&self, request: &DeleteStageDocument) -> Result<MutationAck> {
        self.post(
            &["jobs", request.job_id.as_str(), "documents", request.document_id.as_str(), "delete"],
            request,
        )
        .await
    }
}
