//! # HRP Common Library
//!
//! Shared code for the hiring pipeline tools including:
//! - Pipeline data model (candidates, stage progress, timelines)
//! - Document, approval and eligibility resolvers
//! - Move/finish request construction and guarded stage edits
//! - Board projection with search and pagination
//! - Upstream API client and configuration loading

pub mod api;
pub mod approval;
pub mod board;
pub mod config;
pub mod documents;
pub mod edits;
pub mod eligibility;
pub mod error;
pub mod model;
pub mod pagination;
pub mod transition;

pub use eligibility::{can_move_candidate, Eligibility, StatusReason};
pub use error::{Error, Result};
pub use transition::{build_transition_payload, TransitionPayload, ValidationError};
