//! Error types for stream ingestion.

use thiserror::Error;

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Fatal outcomes of one ingestion call.
///
/// Any of these discards whatever content had been accumulated so far.
/// Malformed individual lines are not represented here; they degrade to
/// raw-text fragments instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Non-2xx response that is not a challenge page.
    #[error("upstream returned HTTP {status}: {body_preview}")]
    UpstreamHttp { status: u16, body_preview: String },

    /// An edge/CDN bot-challenge page was served instead of the API payload.
    #[error("request was blocked by an upstream bot challenge page")]
    BlockedByChallenge,

    /// Success status, but the body is an HTML document.
    #[error("upstream returned an HTML document instead of a completion stream")]
    MalformedUpstreamResponse,

    /// The stream completed without any usable text.
    #[error("upstream stream completed without any content")]
    EmptyContent,

    /// The deadline elapsed before the stream completed.
    #[error("operation cancelled: deadline elapsed before the response completed")]
    Cancelled,

    /// Reading from the transport failed.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IngestError {
    /// Wrap any transport-level error.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        IngestError::Transport(err.into())
    }

    /// Build an `UpstreamHttp` error, truncating the body to `limit` chars.
    pub fn upstream_http(status: u16, body: &str, limit: usize) -> Self {
        IngestError::UpstreamHttp {
            status,
            body_preview: preview(body, limit),
        }
    }
}

/// Truncate `body` to at most `limit` characters, marking the cut.
pub(crate) fn preview(body: &str, limit: usize) -> String {
    let body = body.trim();
    match body.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}
