//! Error types for the review client.

use completion_stream::IngestError;
use thiserror::Error;

/// Result type for review client operations.
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Review client errors.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Nothing to review
    #[error("diff is empty; nothing to review")]
    EmptyDiff,

    /// The completion call failed (HTTP, challenge page, timeout, transport)
    #[error(transparent)]
    Ingest(#[from] IngestError),
}
