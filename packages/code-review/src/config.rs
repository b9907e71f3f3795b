use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretBox;

/// Default review completion endpoint.
pub const DEFAULT_API_URL: &str = "https://yyng.icu/ycr/v1/code-review/completions";

/// Default hard deadline for one review call.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Review bot configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub client_id: String,
    pub client_secret: SecretBox<str>,
    pub agent_name: String,
    pub model_name: String,
    pub model_temperature: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{} must be set", name))
        };

        let timeout_ms = match lookup("REVIEW_TIMEOUT_MS") {
            Some(value) => value
                .trim()
                .parse()
                .context("REVIEW_TIMEOUT_MS must be a valid number of milliseconds")?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: SecretBox::new(Box::from(required("CLIENT_SECRET")?.as_str())),
            agent_name: required("AGENT_NAME")?,
            model_name: required("MODEL_NAME")?,
            model_temperature: required("MODEL_TEMPERATURE")?,
            api_url: lookup("REVIEW_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}
