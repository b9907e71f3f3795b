//! HTTP client for the hosted review completion endpoint.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use completion_stream::{Deadline, FragmentSink, IngestError, ResponseMetadata, StreamIngestor};
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretBox};
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_API_URL, DEFAULT_TIMEOUT_MS};
use crate::error::{ReviewError, Result};
use crate::types::ReviewRequest;

/// Header carrying the Basic credentials expected by the endpoint.
pub const AUTH_HEADER: &str = "x-yang-auth";

/// Review endpoint client.
pub struct ReviewClient {
    http_client: Client,
    endpoint: String,
    credentials: SecretBox<str>,
    timeout: Duration,
}

impl ReviewClient {
    /// Create a client for the default endpoint.
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", client_id, client_secret));
        Self {
            http_client: Client::new(),
            endpoint: DEFAULT_API_URL.to_string(),
            credentials: SecretBox::new(Box::from(encoded.as_str())),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.client_id, config.client_secret.expose_secret())
            .with_endpoint(config.api_url.clone())
            .with_timeout(config.timeout)
    }

    /// Set a custom endpoint URL.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Set the hard deadline for a whole review call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request a review and return the complete text.
    ///
    /// The deadline covers both waiting for the response headers and
    /// reading the body. Fragments are passed to `sink` as they arrive.
    pub async fn review<K: FragmentSink>(&self, request: &ReviewRequest, sink: K) -> Result<String> {
        if request.is_empty() {
            return Err(ReviewError::EmptyDiff);
        }

        let mut deadline = Deadline::start(self.timeout);
        let cancel = deadline.token();
        let start = std::time::Instant::now();

        info!(
            chat_session_id = %request.chat_session_id,
            agent = %request.agent_name,
            model = %request.model_name,
            timeout_ms = self.timeout.as_millis() as u64,
            "Requesting code review"
        );

        let send = self
            .http_client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(AUTH_HEADER, format!("Basic {}", self.credentials.expose_secret()))
            .json(request)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Deadline elapsed before the review endpoint responded");
                return Err(IngestError::Cancelled.into());
            }
            response = send => response.map_err(|e| {
                warn!(error = %e, "Review request failed");
                IngestError::transport(e)
            })?,
        };

        let metadata = metadata_of(&response);
        debug!(
            status = metadata.status,
            content_type = ?metadata.content_type,
            "Review endpoint responded"
        );

        let result = StreamIngestor::new(cancel)
            .with_sink(sink)
            .ingest(&metadata, response.bytes_stream())
            .await;
        deadline.disarm();

        let review = result?;
        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            chars = review.chars().count(),
            "Code review received"
        );
        Ok(review)
    }
}

/// Status and content-type of a response, before its body is touched.
pub fn metadata_of(response: &reqwest::Response) -> ResponseMetadata {
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    ResponseMetadata::new(response.status().as_u16(), content_type)
}
