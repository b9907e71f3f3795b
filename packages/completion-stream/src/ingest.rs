//! Streaming ingestion driver.
//!
//! Pulls raw chunks from a transport stream, decodes them, fails fast on
//! challenge pages, classifies the framing once, and accumulates extracted
//! fragments into the final completion text.

use std::error::Error as StdError;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::challenge::{self, Interstitial};
use crate::decode::Utf8Decoder;
use crate::echo::{FragmentSink, NoEcho};
use crate::error::{IngestError, Result};
use crate::extract::{self, Extracted};
use crate::framing::{self, FramingMode};

/// Maximum characters of an error body kept in `UpstreamHttp` messages.
pub const DEFAULT_PREVIEW_LIMIT: usize = 500;

/// Response status and content-type, captured before the body is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub status: u16,
    pub content_type: Option<String>,
}

impl ResponseMetadata {
    pub fn new(status: u16, content_type: Option<impl Into<String>>) -> Self {
        Self {
            status,
            content_type: content_type.map(Into::into),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Mutable state of one ingestion call.
///
/// Created per call and dropped at its end; never shared between calls.
/// `mode` is `None` until enough text has arrived to inspect the first
/// chunk, then fixed for the rest of the call. Text that is blank, or still
/// a strict prefix of an HTML opening or of `data: `, is held back first.
#[derive(Debug)]
pub struct DecodeState<'a> {
    content_type: Option<&'a str>,
    decoder: Utf8Decoder,
    mode: Option<FramingMode>,
    carry_over: String,
    accumulated: String,
    raw: String,
    units: usize,
    fragments: usize,
}

impl<'a> DecodeState<'a> {
    pub fn new(content_type: Option<&'a str>) -> Self {
        Self {
            content_type,
            decoder: Utf8Decoder::new(),
            mode: None,
            carry_over: String::new(),
            accumulated: String::new(),
            raw: String::new(),
            units: 0,
            fragments: 0,
        }
    }

    pub fn mode(&self) -> Option<FramingMode> {
        self.mode
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Feed one raw chunk from the transport.
    pub fn push_bytes(&mut self, chunk: &[u8], sink: &mut dyn FragmentSink) -> Result<()> {
        let text = self.decoder.decode(chunk);
        self.push_text(&text, sink)
    }

    /// End of stream: flush decoder and carry-over, then produce the result.
    pub fn finish(mut self, sink: &mut dyn FragmentSink) -> Result<String> {
        let tail = self.decoder.finish();
        self.push_text(&tail, sink)?;

        // A short body may end while still held back for inspection.
        if self.mode.is_none() && !self.carry_over.trim().is_empty() {
            self.inspect_buffered(sink)?;
        }

        if let Some(mode) = self.mode {
            let carry_over = std::mem::take(&mut self.carry_over);
            let extracted = extract::finish(mode, carry_over);
            self.apply(extracted, sink);
        }

        // Nothing was recognised as a unit: fall back to the raw body.
        let text = if self.units == 0 { self.raw } else { self.accumulated };

        if text.trim().is_empty() {
            warn!(mode = ?self.mode, "completion stream ended without content");
            return Err(IngestError::EmptyContent);
        }

        debug!(
            mode = ?self.mode,
            fragments = self.fragments,
            chars = text.chars().count(),
            "completion stream ingested"
        );
        Ok(text)
    }

    fn push_text(&mut self, text: &str, sink: &mut dyn FragmentSink) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.raw.push_str(text);

        match self.mode {
            Some(mode) => {
                let extracted = extract::extract(mode, std::mem::take(&mut self.carry_over), text);
                self.apply(extracted, sink);
                Ok(())
            }
            None => {
                self.carry_over.push_str(text);
                if needs_more_input(&self.carry_over) {
                    return Ok(());
                }
                self.inspect_buffered(sink)
            }
        }
    }

    /// Run the first-chunk checks on everything held back so far.
    fn inspect_buffered(&mut self, sink: &mut dyn FragmentSink) -> Result<()> {
        let first = std::mem::take(&mut self.carry_over);
        let mode = self.inspect_first_chunk(&first)?;
        let extracted = extract::extract(mode, String::new(), &first);
        self.apply(extracted, sink);
        Ok(())
    }

    fn inspect_first_chunk(&mut self, first: &str) -> Result<FramingMode> {
        match challenge::inspect(first) {
            Some(Interstitial::Challenge) => {
                warn!("first chunk is a bot challenge page");
                return Err(IngestError::BlockedByChallenge);
            }
            Some(Interstitial::HtmlDocument) => {
                warn!("first chunk is an HTML document");
                return Err(IngestError::MalformedUpstreamResponse);
            }
            None => {}
        }

        let mode = framing::classify(self.content_type, first);
        debug!(mode = ?mode, content_type = ?self.content_type, "classified completion framing");
        self.mode = Some(mode);
        Ok(mode)
    }

    fn apply(&mut self, extracted: Extracted, sink: &mut dyn FragmentSink) {
        self.carry_over = extracted.carry_over;
        self.units += extracted.units;
        for fragment in extracted.fragments {
            if !fragment.is_empty() {
                sink.on_fragment(&fragment);
            }
            self.accumulated.push_str(&fragment);
            self.fragments += 1;
        }
    }
}

/// Whether the text held back so far is too short to run the first-chunk
/// checks on without the outcome depending on where the transport split it.
fn needs_more_input(buffered: &str) -> bool {
    buffered.trim().is_empty()
        || challenge::may_open_html_document(buffered)
        || framing::may_open_sse_line(buffered)
}

/// Drives one response body to completion under a cancellation signal.
pub struct StreamIngestor<K = NoEcho> {
    cancel: CancellationToken,
    sink: K,
    preview_limit: usize,
}

impl StreamIngestor<NoEcho> {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            sink: NoEcho,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

impl<K: FragmentSink> StreamIngestor<K> {
    /// Echo fragments to `sink` as they arrive.
    pub fn with_sink<S: FragmentSink>(self, sink: S) -> StreamIngestor<S> {
        StreamIngestor {
            cancel: self.cancel,
            sink,
            preview_limit: self.preview_limit,
        }
    }

    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Consume `body` and return the accumulated completion text.
    ///
    /// The body stream is dropped on every exit path, which aborts the
    /// underlying read when the call fails or is cancelled.
    pub async fn ingest<S, E>(&mut self, metadata: &ResponseMetadata, body: S) -> Result<String>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let mut body = std::pin::pin!(body);

        if !metadata.is_success() {
            let text = self.read_to_string(&mut body).await?;
            if challenge::inspect(&text).is_some() {
                warn!(status = metadata.status, "upstream error body is a challenge page");
                return Err(IngestError::BlockedByChallenge);
            }
            warn!(status = metadata.status, "upstream returned an error status");
            return Err(IngestError::upstream_http(metadata.status, &text, self.preview_limit));
        }

        let mut state = DecodeState::new(metadata.content_type.as_deref());
        while let Some(chunk) = self.next_chunk(&mut body).await? {
            state.push_bytes(&chunk, &mut self.sink)?;
        }
        state.finish(&mut self.sink)
    }

    async fn next_chunk<S, E>(&self, body: &mut std::pin::Pin<&mut S>) -> Result<Option<Bytes>>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!("deadline elapsed while reading completion stream");
                Err(IngestError::Cancelled)
            }
            next = body.next() => match next {
                Some(Ok(chunk)) => Ok(Some(chunk)),
                Some(Err(e)) => Err(IngestError::transport(e)),
                None => Ok(None),
            },
        }
    }

    async fn read_to_string<S, E>(&self, body: &mut std::pin::Pin<&mut S>) -> Result<String>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let mut decoder = Utf8Decoder::new();
        let mut text = String::new();
        while let Some(chunk) = self.next_chunk(body).await? {
            text.push_str(&decoder.decode(&chunk));
        }
        text.push_str(&decoder.finish());
        Ok(text)
    }
}

/// Ingest `body` without echoing.
pub async fn ingest<S, E>(metadata: &ResponseMetadata, body: S, cancel: CancellationToken) -> Result<String>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    StreamIngestor::new(cancel).ingest(metadata, body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::time::Duration;

    use proptest::prelude::*;

    use crate::deadline::Deadline;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> {
        let owned: Vec<_> = parts.iter().map(|p| Ok(Bytes::copy_from_slice(p))).collect();
        futures::stream::iter(owned)
    }

    fn sse() -> ResponseMetadata {
        ResponseMetadata::new(200, Some("text/event-stream"))
    }

    fn run_sync(metadata: &ResponseMetadata, parts: &[&[u8]]) -> Result<String> {
        let mut state = DecodeState::new(metadata.content_type.as_deref());
        for part in parts {
            state.push_bytes(part, &mut NoEcho)?;
        }
        state.finish(&mut NoEcho)
    }

    #[tokio::test]
    async fn test_content_split_across_chunks() {
        let body = chunks(&[b"data: {\"content\":\"Hel", b"lo\"}\n\ndata: [DONE]\n"]);
        let text = ingest(&sse(), body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn test_openai_style_deltas() {
        let body = chunks(&[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Looks \"}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"good.\"}}]}\n\ndata: [DONE]\n\n",
        ]);
        let text = ingest(&sse(), body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "Looks good.");
    }

    #[tokio::test]
    async fn test_malformed_line_does_not_abort() {
        let body = chunks(&[b"data: {\"text\":\"a\"}\ndata: not-json\ndata: {\"text\":\"b\"}\n"]);
        let text = ingest(&sse(), body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "anot-jsonb");
    }

    #[tokio::test]
    async fn test_sse_without_trailing_newline() {
        let body = chunks(&[b"data: {\"content\":\"one\"}\n", b"data: {\"content\":\"two\"}"]);
        let text = ingest(&sse(), body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "onetwo");
    }

    #[tokio::test]
    async fn test_ndjson_stream() {
        let metadata = ResponseMetadata::new(200, Some("application/x-ndjson"));
        let body = chunks(&[b"{\"content\":\"A\"}\n{\"te", b"xt\":\"B\"}\n\n"]);
        let text = ingest(&metadata, body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "AB");
    }

    #[tokio::test]
    async fn test_plain_text_passthrough() {
        let metadata = ResponseMetadata::new(200, Some("text/plain; charset=utf-8"));
        let body = chunks(&[b"## Review\n\n", b"- rename `foo`\n"]);
        let text = ingest(&metadata, body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "## Review\n\n- rename `foo`\n");
    }

    #[tokio::test]
    async fn test_plain_text_keeps_leading_whitespace() {
        let metadata = ResponseMetadata::new(200, None::<String>);
        let body = chunks(&[b"\n  ", b"Fine.\n"]);
        let text = ingest(&metadata, body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "\n  Fine.\n");
    }

    #[tokio::test]
    async fn test_prose_with_data_prefix_is_read_as_sse() {
        // Ambiguous input: prose that contains the SSE prefix is classified
        // as SSE and only its `data: ` lines survive.
        let metadata = ResponseMetadata::new(200, Some("text/plain"));
        let body = chunks(&[b"Intro line\ndata: the config value\nOutro\n"]);
        let text = ingest(&metadata, body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "the config value");
    }

    #[tokio::test]
    async fn test_sse_without_data_lines_falls_back_to_raw_body() {
        let body = chunks(&[b"no framing at all"]);
        let text = ingest(&sse(), body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "no framing at all");
    }

    #[tokio::test]
    async fn test_challenge_in_first_chunk_fails_fast() {
        let body = chunks(&[
            b"<!DOCTYPE html><title>Just a moment...</title>",
            b"data: {\"content\":\"valid\"}\n",
        ]);
        let err = ingest(&sse(), body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::BlockedByChallenge));
    }

    #[tokio::test]
    async fn test_html_document_is_malformed() {
        let body = chunks(&[b"  <html><body>Maintenance</body></html>"]);
        let err = ingest(&sse(), body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::MalformedUpstreamResponse));
    }

    #[test]
    fn test_html_opening_split_early_is_still_malformed() {
        let body = b"<!DOCTYPE html><html><body>Maintenance</body></html>";
        let err = run_sync(&sse(), &[&body[..5], &body[5..]]).unwrap_err();
        assert!(matches!(err, IngestError::MalformedUpstreamResponse));
    }

    #[test]
    fn test_data_prefix_split_early_is_still_sse() {
        let metadata = ResponseMetadata::new(200, None::<String>);
        let body = b"data: {\"content\":\"Hello\"}\n\ndata: [DONE]\n";
        let text = run_sync(&metadata, &[&body[..3], &body[3..]]).unwrap();
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_short_body_held_back_is_inspected_at_end() {
        let metadata = ResponseMetadata::new(200, None::<String>);
        assert_eq!(run_sync(&metadata, &[b"da", b"ta"]).unwrap(), "data");
        assert_eq!(run_sync(&metadata, &[b"<ht"]).unwrap(), "<ht");
    }

    #[tokio::test]
    async fn test_later_chunks_not_rescanned() {
        let body = chunks(&[
            b"data: {\"content\":\"The page says \"}\n",
            b"data: {\"content\":\"Just a moment...\"}\n",
        ]);
        let text = ingest(&sse(), body, CancellationToken::new()).await.unwrap();
        assert_eq!(text, "The page says Just a moment...");
    }

    #[tokio::test]
    async fn test_error_status_with_challenge_body() {
        let metadata = ResponseMetadata::new(403, Some("text/html"));
        let body = chunks(&[b"<html><script>window._cf_chl_opt={}</script></html>"]);
        let err = ingest(&metadata, body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::BlockedByChallenge));
    }

    #[tokio::test]
    async fn test_error_status_with_html_body_is_blocked() {
        let metadata = ResponseMetadata::new(503, Some("text/html"));
        let body = chunks(&[b"<!doctype html><p>Service unavailable</p>"]);
        let err = ingest(&metadata, body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::BlockedByChallenge));
    }

    #[tokio::test]
    async fn test_error_status_preview_is_bounded() {
        let metadata = ResponseMetadata::new(500, Some("application/json"));
        let long = format!("{{\"error\":\"{}\"}}", "x".repeat(2000));
        let body = chunks(&[long.as_bytes()]);
        let err = StreamIngestor::new(CancellationToken::new())
            .with_preview_limit(40)
            .ingest(&metadata, body)
            .await
            .unwrap_err();
        match err {
            IngestError::UpstreamHttp { status, body_preview } => {
                assert_eq!(status, 500);
                assert_eq!(body_preview.chars().count(), 41);
                assert!(body_preview.starts_with("{\"error\":\"xxx"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_only_done_is_empty_content() {
        let body = chunks(&[b"data: [DONE]\n\n"]);
        let err = ingest(&sse(), body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyContent));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_content() {
        let body = chunks(&[]);
        let err = ingest(&sse(), body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyContent));

        let body = chunks(&[b"  \n", b"\n"]);
        let err = ingest(&sse(), body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyContent));
    }

    #[tokio::test]
    async fn test_whitespace_only_fragments_are_empty_content() {
        let body = chunks(&[b"data: {\"content\":\"  \"}\ndata: {\"content\":\"\\n\"}\n"]);
        let err = ingest(&sse(), body, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyContent));
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let items: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"content\":\"partial\"}\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let err = ingest(&sse(), futures::stream::iter(items), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Transport(_)));
        assert!(err.to_string().contains("reset"));
    }

    #[tokio::test]
    async fn test_deadline_beats_stalled_stream() {
        let first: std::result::Result<Bytes, Infallible> =
            Ok(Bytes::from_static(b"data: {\"content\":\"a lot of review\"}\n"));
        let body = futures::stream::iter(vec![first]).chain(futures::stream::pending());

        let deadline = Deadline::start(Duration::from_millis(50));
        let err = ingest(&sse(), body, deadline.token()).await.unwrap_err();
        assert!(matches!(err, IngestError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_wins_over_ready_chunks() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let body = chunks(&[b"data: {\"content\":\"ready\"}\n"]);
        let err = ingest(&sse(), body, cancel).await.unwrap_err();
        assert!(matches!(err, IngestError::Cancelled));
    }

    #[tokio::test]
    async fn test_echo_sees_fragments_in_order() {
        let body = chunks(&[
            b"data: {\"content\":\"one \"}\n",
            b"data: [DONE]\ndata: {\"text\":\"two\"}\n",
        ]);
        let mut seen = Vec::new();
        let text = StreamIngestor::new(CancellationToken::new())
            .with_sink(|fragment: &str| seen.push(fragment.to_string()))
            .ingest(&sse(), body)
            .await
            .unwrap();
        assert_eq!(text, "one two");
        assert_eq!(seen, vec!["one ", "two"]);
    }

    #[test]
    fn test_mode_fixed_after_first_chunk() {
        let mut state = DecodeState::new(None);
        state.push_bytes(b"   \n", &mut NoEcho).unwrap();
        assert_eq!(state.mode(), None);

        state.push_bytes(b"{\"content\":\"x\"}\n", &mut NoEcho).unwrap();
        assert_eq!(state.mode(), Some(FramingMode::NewlineDelimitedJson));

        state.push_bytes(b"data: {\"content\":\"y\"}\n", &mut NoEcho).unwrap();
        assert_eq!(state.mode(), Some(FramingMode::NewlineDelimitedJson));
        assert_eq!(state.accumulated(), "xdata: {\"content\":\"y\"}");
    }

    #[test]
    fn test_multibyte_split_in_sse_payload() {
        let body = "data: {\"content\":\"naïve 🦀\"}\n\ndata: [DONE]\n".as_bytes();
        let crab = body.iter().position(|&b| b == 0xF0).unwrap();
        let text = run_sync(&sse(), &[&body[..crab + 2], &body[crab + 2..]]).unwrap();
        assert_eq!(text, "naïve 🦀");
    }

    const SSE_BODY: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Überblick: \"}}]}\n\n",
        "event: ping\n\n",
        "data: {\"content\":\"naïve “quotes” \"}\n\n",
        "data: not-json 🦀\n\n",
        "data: {\"text\":\"日本語\",\"other\":1}\n\n",
        "data: [DONE]\n\n",
    );

    const NDJSON_BODY: &str = "{\"content\":\"ä\"}\n\n{\"text\":\"ö\"}\nraw ü line\n{\"content\":\"end\"}";

    const PLAIN_BODY: &str = "Zusammenfassung — alles gut ✅\n\n- prüfen\n";

    const JSON_LINES_BODY: &str = "{\"content\":\"grüße \"}\n{\"text\":\"🦀\"}\n\n{\"content\":\"!\"}\n";

    const HTML_BODIES: &[&str] = &[
        "<!DOCTYPE html><html><body>Maintenance</body></html>",
        "\n  <html lang=\"de\"><body>Wartung läuft</body></html>",
        "<HTML><BODY>502 Bad Gateway</BODY></HTML>",
    ];

    fn split_at_points(body: &[u8], mut points: Vec<usize>) -> Vec<&[u8]> {
        points.sort_unstable();
        points.dedup();
        let mut parts = Vec::new();
        let mut start = 0;
        for point in points {
            parts.push(&body[start..point]);
            start = point;
        }
        parts.push(&body[start..]);
        parts
    }

    proptest! {
        #[test]
        fn prop_sse_chunk_split_invariance(points in prop::collection::vec(0..SSE_BODY.len(), 0..12)) {
            let whole = run_sync(&sse(), &[SSE_BODY.as_bytes()]).unwrap();
            let parts = split_at_points(SSE_BODY.as_bytes(), points);
            prop_assert_eq!(run_sync(&sse(), &parts).unwrap(), whole);
        }

        #[test]
        fn prop_ndjson_chunk_split_invariance(points in prop::collection::vec(0..NDJSON_BODY.len(), 0..12)) {
            let metadata = ResponseMetadata::new(200, Some("application/x-ndjson"));
            let whole = run_sync(&metadata, &[NDJSON_BODY.as_bytes()]).unwrap();
            prop_assert_eq!(whole.as_str(), "äöraw ü lineend");
            let parts = split_at_points(NDJSON_BODY.as_bytes(), points);
            prop_assert_eq!(run_sync(&metadata, &parts).unwrap(), whole);
        }

        #[test]
        fn prop_plain_text_chunk_split_invariance(points in prop::collection::vec(0..PLAIN_BODY.len(), 0..12)) {
            let metadata = ResponseMetadata::new(200, Some("text/plain"));
            let parts = split_at_points(PLAIN_BODY.as_bytes(), points);
            prop_assert_eq!(run_sync(&metadata, &parts).unwrap(), PLAIN_BODY);
        }

        #[test]
        fn prop_undeclared_framing_chunk_split_invariance(
            body in prop::sample::select(vec![SSE_BODY, JSON_LINES_BODY]),
            points in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
        ) {
            let metadata = ResponseMetadata::new(200, None::<String>);
            let whole = run_sync(&metadata, &[body.as_bytes()]).unwrap();
            let points = points.iter().map(|i| i.index(body.len() + 1)).collect();
            let parts = split_at_points(body.as_bytes(), points);
            prop_assert_eq!(run_sync(&metadata, &parts).unwrap(), whole);
        }

        #[test]
        fn prop_html_body_rejected_at_any_split(
            body in prop::sample::select(HTML_BODIES.to_vec()),
            declared in prop::option::of(Just("text/event-stream")),
            points in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
        ) {
            let metadata = ResponseMetadata::new(200, declared);
            let points = points.iter().map(|i| i.index(body.len() + 1)).collect();
            let parts = split_at_points(body.as_bytes(), points);
            let result = run_sync(&metadata, &parts);
            prop_assert!(matches!(result, Err(IngestError::MalformedUpstreamResponse)), "{:?}", result);
        }
    }

    #[test]
    fn test_sse_body_expected_text() {
        let text = run_sync(&sse(), &[SSE_BODY.as_bytes()]).unwrap();
        assert_eq!(text, "Überblick: naïve “quotes” not-json 🦀日本語");
    }

    #[test]
    fn test_undeclared_sse_body_expected_text() {
        let metadata = ResponseMetadata::new(200, None::<String>);
        let text = run_sync(&metadata, &[SSE_BODY.as_bytes()]).unwrap();
        assert_eq!(text, "Überblick: naïve “quotes” not-json 🦀日本語");
        let text = run_sync(&metadata, &[JSON_LINES_BODY.as_bytes()]).unwrap();
        assert_eq!(text, "grüße 🦀!");
    }

    #[test]
    fn test_sse_one_byte_chunks() {
        let parts: Vec<&[u8]> = SSE_BODY.as_bytes().chunks(1).collect();
        let text = run_sync(&sse(), &parts).unwrap();
        assert_eq!(text, "Überblick: naïve “quotes” not-json 🦀日本語");
    }
}
