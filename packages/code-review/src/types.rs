//! Review endpoint request types.

use serde::Serialize;
use uuid::Uuid;

/// Body of a code-review completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    /// Fresh per call; the endpoint keys its chat session on it.
    pub chat_session_id: Uuid,

    /// Reviewer agent configured on the endpoint (e.g., "yang-code-review")
    pub agent_name: String,

    /// Backing model name
    pub model_name: String,

    /// Sampling temperature, forwarded verbatim as configured
    pub model_temperature: String,

    /// Conversation messages; the diff goes in a single user message
    pub messages: Vec<Message>,
}

impl ReviewRequest {
    /// Create a request with a new random session id and no messages.
    pub fn new(
        agent_name: impl Into<String>,
        model_name: impl Into<String>,
        model_temperature: impl Into<String>,
    ) -> Self {
        Self {
            chat_session_id: Uuid::new_v4(),
            agent_name: agent_name.into(),
            model_name: model_name.into(),
            model_temperature: model_temperature.into(),
            messages: Vec::new(),
        }
    }

    /// Add the diff under review as a user message.
    pub fn diff(mut self, diff: impl Into<String>) -> Self {
        self.messages.push(Message::user(diff));
        self
    }

    /// Whether there is anything to review.
    pub fn is_empty(&self) -> bool {
        self.messages.iter().all(|m| m.content.trim().is_empty())
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Role: "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
