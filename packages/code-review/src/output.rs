//! Where a finished review goes.
//!
//! Posting the comment or uploading the artifact happens in later workflow
//! steps; this module only hands the text to the right place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Artifact path used for push events when none is given.
pub const DEFAULT_ARTIFACT_PATH: &str = "review.md";

/// Destination of a finished review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Review text on stdout, picked up and posted as a PR comment.
    PullRequestComment,
    /// Review written to a file uploaded as a build artifact.
    PushArtifact(PathBuf),
}

impl Destination {
    /// An explicit artifact path wins; otherwise push events produce an
    /// artifact and everything else a comment.
    pub fn resolve(artifact: Option<PathBuf>, event_name: Option<&str>) -> Self {
        match (artifact, event_name) {
            (Some(path), _) => Destination::PushArtifact(path),
            (None, Some("push")) => Destination::PushArtifact(PathBuf::from(DEFAULT_ARTIFACT_PATH)),
            (None, _) => Destination::PullRequestComment,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Destination::PullRequestComment)
    }
}

/// Deliver `review` to `destination`.
///
/// When the review was already echoed live to stdout, the comment
/// destination does not print it a second time.
pub async fn publish(review: &str, destination: &Destination, echoed: bool) -> Result<()> {
    match destination {
        Destination::PullRequestComment => {
            if !echoed {
                println!("{}", review);
            }
            info!(chars = review.chars().count(), "Review ready for pull-request comment");
        }
        Destination::PushArtifact(path) => {
            write_artifact(path, review).await?;
            info!(path = %path.display(), "Review written as artifact");
        }
    }
    Ok(())
}

/// Format `message` as a workflow `::error::` command.
///
/// `%`, `\r` and `\n` are percent-encoded so a multi-line message stays one
/// annotation.
pub fn error_annotation(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{}", escaped)
}

async fn write_artifact(path: &Path, review: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, review)
        .await
        .with_context(|| format!("Failed to write review artifact to {}", path.display()))
}
