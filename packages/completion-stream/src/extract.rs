//! Fragment extraction for each framing mode.
//!
//! Extraction is pure: it takes the previous carry-over and one decoded chunk
//! and returns the fragments found plus the new carry-over. Lines that fail
//! to parse as JSON become raw-text fragments; nothing in here is fatal.

use serde_json::Value;

use crate::framing::{FramingMode, SSE_DATA_PREFIX, SSE_DONE};

/// Known places a completion payload keeps its text, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentField {
    /// `{"choices":[{"delta":{"content": ...}}]}`
    ChatDelta,
    /// `{"content": ...}`
    Content,
    /// `{"text": ...}`
    Text,
}

impl ContentField {
    pub const PRIORITY: [ContentField; 3] = [ContentField::ChatDelta, ContentField::Content, ContentField::Text];

    fn pick(self, value: &Value) -> Option<&str> {
        let field = match self {
            ContentField::ChatDelta => value.pointer("/choices/0/delta/content"),
            ContentField::Content => value.get("content"),
            ContentField::Text => value.get("text"),
        };
        field.and_then(Value::as_str)
    }
}

/// Text of the first populated field in [`ContentField::PRIORITY`], or `""`.
pub fn content_of(value: &Value) -> &str {
    ContentField::PRIORITY
        .iter()
        .find_map(|field| field.pick(value))
        .unwrap_or_default()
}

/// Output of one extraction step.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Fragments in the order they appeared.
    pub fragments: Vec<String>,
    /// Unterminated tail to prepend to the next chunk.
    pub carry_over: String,
    /// Parsed units seen (data lines, JSON lines, plain chunks), including
    /// ones that produced no text such as `[DONE]`.
    pub units: usize,
}

/// Extract fragments from `chunk`, given the carry-over of the previous one.
pub fn extract(mode: FramingMode, carry_over: String, chunk: &str) -> Extracted {
    match mode {
        FramingMode::PlainText => plain_text(carry_over, chunk),
        FramingMode::ServerSentEvents | FramingMode::NewlineDelimitedJson => {
            let mut buffer = carry_over;
            buffer.push_str(chunk);

            let Some(newline_pos) = buffer.rfind('\n') else {
                return Extracted {
                    carry_over: buffer,
                    ..Default::default()
                };
            };

            let rest = buffer.split_off(newline_pos + 1);
            let mut extracted = complete_lines(mode, &buffer);
            extracted.carry_over = rest;
            extracted
        }
    }
}

/// Flush the final carry-over at end of stream, treating it as a complete line.
pub fn finish(mode: FramingMode, carry_over: String) -> Extracted {
    match mode {
        FramingMode::PlainText => plain_text(carry_over, ""),
        FramingMode::ServerSentEvents | FramingMode::NewlineDelimitedJson => complete_lines(mode, &carry_over),
    }
}

fn plain_text(carry_over: String, chunk: &str) -> Extracted {
    let mut text = carry_over;
    text.push_str(chunk);
    if text.is_empty() {
        return Extracted::default();
    }
    Extracted {
        fragments: vec![text],
        carry_over: String::new(),
        units: 1,
    }
}

fn complete_lines(mode: FramingMode, text: &str) -> Extracted {
    let mut extracted = Extracted::default();
    for line in text.lines() {
        let fragment = match mode {
            FramingMode::ServerSentEvents => sse_line(line),
            _ => json_line(line),
        };
        match fragment {
            LineOutcome::Fragment(fragment) => {
                extracted.units += 1;
                extracted.fragments.push(fragment);
            }
            LineOutcome::Done => extracted.units += 1,
            LineOutcome::Skip => {}
        }
    }
    extracted
}

enum LineOutcome {
    Fragment(String),
    Done,
    Skip,
}

fn sse_line(line: &str) -> LineOutcome {
    // Non-data lines ("event:", "id:", comments, separators) carry no content.
    let Some(data) = line.strip_prefix(SSE_DATA_PREFIX) else {
        return LineOutcome::Skip;
    };
    let data = data.trim();

    if data == SSE_DONE {
        return LineOutcome::Done;
    }

    LineOutcome::Fragment(parse_payload(data))
}

fn json_line(line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Skip;
    }
    LineOutcome::Fragment(parse_payload(line))
}

fn parse_payload(payload: &str) -> String {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => content_of(&value).to_string(),
        Err(_) => payload.to_string(),
    }
}
