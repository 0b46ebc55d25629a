//! Pipeline data model
//!
//! Read-only mirror of the upstream API's JSON. Nothing here is persisted;
//! every value lives for the duration of one fetch.

mod serde_helpers;

pub mod candidate;
pub mod pipeline;
pub mod stage;

pub use candidate::{Candidate, CandidateAddress};
pub use pipeline::{
    Pipeline, PipelineState, Stage, StageTimeline, TimelineEntry, TimelineStage, WorkOrder,
};
pub use stage::{
    AdditionalDocument, ApprovalDetails, ApprovalLevel, ApprovalRef, AssignedRecruiter,
    RecruiterInfo, RecruiterReview, ReviewStatus, StageDefinition, StageProgress, StageStatus,
    UploadedDocument,
};
