//! Code review bot.
//!
//! Sends a pull-request diff to the hosted review endpoint, ingests the
//! streamed completion with `completion-stream`, and hands the finished
//! review to its destination.
//!
//! # Example
//!
//! ```rust,ignore
//! use code_review::{Config, ReviewClient, ReviewRequest};
//! use completion_stream::WriterEcho;
//!
//! let config = Config::from_env()?;
//! let client = ReviewClient::from_config(&config);
//!
//! let request = ReviewRequest::new(&config.agent_name, &config.model_name, &config.model_temperature)
//!     .diff(diff);
//! let review = client.review(&request, WriterEcho::stdout()).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod types;

pub use client::{metadata_of, ReviewClient, AUTH_HEADER};
pub use config::Config;
pub use error::{ReviewError, Result};
pub use output::{error_annotation, publish, Destination};
pub use types::{Message, ReviewRequest};
