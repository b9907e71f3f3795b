//! Wire framing classification.
//!
//! The framing is decided once, from the response content-type and the first
//! non-empty chunk of the body, and never revisited. A plain-text body whose
//! first chunk happens to contain `data: ` is read as SSE; that ambiguity is
//! accepted rather than guessed around.

use serde_json::Value;

/// SSE content line prefix, including the single trailing space.
pub const SSE_DATA_PREFIX: &str = "data: ";

/// SSE end-of-stream sentinel.
pub const SSE_DONE: &str = "[DONE]";

const EVENT_STREAM_MEDIA_TYPE: &str = "text/event-stream";
const NDJSON_MEDIA_TYPES: &[&str] = &["application/x-ndjson", "application/jsonl", "application/json"];

/// Extraction grammar applied to a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    /// Server-Sent Events: `data: ` lines.
    ServerSentEvents,
    /// One JSON value per line.
    NewlineDelimitedJson,
    /// Chunks passed through untouched.
    PlainText,
}

/// Pick the framing for a response.
///
/// `first_chunk` is the first decoded text that contains anything other than
/// whitespace.
pub fn classify(content_type: Option<&str>, first_chunk: &str) -> FramingMode {
    let content_type = content_type.map(str::to_ascii_lowercase).unwrap_or_default();

    if content_type.contains(EVENT_STREAM_MEDIA_TYPE) || first_chunk.contains(SSE_DATA_PREFIX) {
        return FramingMode::ServerSentEvents;
    }

    if NDJSON_MEDIA_TYPES.iter().any(|t| content_type.contains(t)) || looks_like_json_lines(first_chunk) {
        return FramingMode::NewlineDelimitedJson;
    }

    FramingMode::PlainText
}

/// True if `text`, after leading whitespace, is a strict prefix of
/// [`SSE_DATA_PREFIX`], so more input is needed to tell.
pub fn may_open_sse_line(text: &str) -> bool {
    let rest = text.trim_start();
    !rest.is_empty() && rest.len() < SSE_DATA_PREFIX.len() && SSE_DATA_PREFIX.starts_with(rest)
}

/// True if every complete, non-blank line of `chunk` is a JSON object.
///
/// When the chunk holds no complete line yet (a JSON object split by the
/// transport), an opening brace is taken as the signal.
///
/// Only objects count. Bare scalars and arrays carry none of the content
/// fields, so a body of them (`42\ntrue\n`) is read as plain text instead.
fn looks_like_json_lines(chunk: &str) -> bool {
    let mut lines: Vec<&str> = chunk.split('\n').collect();
    // The last piece is unterminated (or empty if the chunk ends in '\n').
    let tail = lines.pop().unwrap_or_default();

    let complete: Vec<&str> = lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if complete.is_empty() {
        return tail.trim_start().starts_with('{');
    }

    complete
        .iter()
        .all(|line| matches!(serde_json::from_str::<Value>(line), Ok(Value::Object(_))))
}
