//! Common error types for HRP

use thiserror::Error;

use crate::edits::EditError;
use crate::eligibility::StatusReason;
use crate::transition::ValidationError;

/// Common result type for HRP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across HRP crates
#[derive(Error, Debug)]
pub enum Error {
    /// Move/finish request rejected before any network call
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Auxiliary stage edit rejected before any network call
    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),

    /// Candidate cannot leave the stage in its current state
    #[error("Candidate not eligible: {}", .0.message())]
    NotEligible(StatusReason),

    /// Requested resource not found in the fetched state
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream API answered with a failure
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure talking to the upstream API
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures raised locally before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Edit(_) | Error::NotEligible(_) | Error::NotFound(_)
        )
    }
}
