//! Error types for the leavecal export engine.

use thiserror::Error;

use crate::ics::IdentityError;
use crate::mail::MailError;
use crate::record::RecordError;
use crate::store::StoreError;

/// Where in the export pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Fetch,
    Render,
    Deliver,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Fetch => "fetch",
            Stage::Render => "render",
            Stage::Deliver => "deliver",
        };
        f.write_str(name)
    }
}

/// Errors that abort an export.
///
/// A failure to stamp records after a successful delivery is not one of these:
/// it is reported on the outcome (see [`crate::sync::MarkReport`]).
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("Fetching records failed: {0}")]
    Fetch(#[from] StoreError),

    #[error("Rendering {leaves} leave and {holidays} holiday events failed: {source}")]
    Render {
        leaves: usize,
        holidays: usize,
        #[source]
        source: RenderError,
    },

    #[error("Delivery of {leaves} leave and {holidays} holiday events failed: {source}")]
    Delivery {
        leaves: usize,
        holidays: usize,
        #[source]
        source: MailError,
    },
}

impl ExportError {
    /// The pipeline stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            ExportError::InvalidRequest(_) | ExportError::UnknownTenant(_) => Stage::Validate,
            ExportError::Fetch(_) => Stage::Fetch,
            ExportError::Render { .. } => Stage::Render,
            ExportError::Delivery { .. } => Stage::Deliver,
        }
    }
}

/// A record that cannot be encoded as a VEVENT.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
