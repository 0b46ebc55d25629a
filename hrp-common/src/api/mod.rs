//! Upstream pipeline API access
//!
//! `types` holds the wire bodies; `client` holds the [`PipelineApi`] trait
//! and its reqwest implementation. Binaries depend on the trait so tests can
//! substitute an in-memory API.

pub mod client;
pub mod types;

pub use client::{ApiClient, PipelineApi};
pub use types::{
    extract_error_message, AddStageDocument, DeleteStageDocument, MutationAck, UpdateStageDates,
    UpdateStageRecruiters, GENERIC_ERROR_MESSAGE,
};
