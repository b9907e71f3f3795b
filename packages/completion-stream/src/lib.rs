//! Streaming ingestion for LLM completion responses.
//!
//! Reads a response body chunk by chunk, works out whether the server speaks
//! Server-Sent Events, newline-delimited JSON or plain text, and accumulates
//! the extracted content into one string. Challenge pages and stray HTML are
//! rejected on the first chunk, and a [`Deadline`] cancels the read cleanly.
//!
//! # Example
//!
//! ```rust,ignore
//! use completion_stream::{Deadline, ResponseMetadata, StreamIngestor, WriterEcho};
//!
//! let mut deadline = Deadline::start(Duration::from_secs(15));
//! let metadata = ResponseMetadata::new(status, content_type);
//!
//! let review = StreamIngestor::new(deadline.token())
//!     .with_sink(WriterEcho::stdout())
//!     .ingest(&metadata, response.bytes_stream())
//!     .await;
//! deadline.disarm();
//! ```

pub mod challenge;
pub mod deadline;
pub mod decode;
pub mod echo;
pub mod error;
pub mod extract;
pub mod framing;
pub mod ingest;

pub use challenge::Interstitial;
pub use deadline::Deadline;
pub use decode::Utf8Decoder;
pub use echo::{FragmentSink, NoEcho, WriterEcho};
pub use error::{IngestError, Result};
pub use extract::{content_of, ContentField};
pub use framing::FramingMode;
pub use ingest::{ingest, DecodeState, ResponseMetadata, StreamIngestor, DEFAULT_PREVIEW_LIMIT};

pub use tokio_util::sync::CancellationToken;
