//! Code review bot entry point.
//!
//! Reads a diff, requests a review from the hosted endpoint, echoes it live
//! and delivers it as a pull-request comment or a push artifact.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use code_review::{error_annotation, publish, Config, Destination, ReviewClient, ReviewRequest};
use completion_stream::{NoEcho, WriterEcho};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "code-review", version, about = "Review a pull-request diff with a hosted model")]
struct Args {
    /// Diff to review; `-` reads stdin
    #[arg(long, default_value = "-")]
    diff: String,

    /// Write the review to this file instead of posting it as a comment
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Workflow event that triggered the run (`push` selects artifact output)
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: Option<String>,

    /// Override REVIEW_TIMEOUT_MS
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Do not echo the review while it streams in
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the review.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,code_review=debug,completion_stream=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Code review failed");
        println!("{}", error_annotation(&format!("{:#}", e)));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout = Duration::from_millis(timeout_ms);
    }

    let diff = read_diff(&args.diff).await?;
    let destination = Destination::resolve(args.artifact, args.event_name.as_deref());
    tracing::info!(destination = ?destination, diff_bytes = diff.len(), "Starting code review");

    let client = ReviewClient::from_config(&config);
    let request = ReviewRequest::new(&config.agent_name, &config.model_name, &config.model_temperature)
        .diff(diff);

    let review = if args.quiet {
        client.review(&request, NoEcho).await?
    } else {
        // End the echoed line even when the review fails.
        let review = client.review(&request, WriterEcho::stdout()).await;
        println!();
        review?
    };

    publish(&review, &destination, !args.quiet).await
}

async fn read_diff(source: &str) -> Result<String> {
    if source == "-" {
        let mut diff = String::new();
        tokio::io::stdin()
            .read_to_string(&mut diff)
            .await
            .context("Failed to read diff from stdin")?;
        return Ok(diff);
    }

    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read diff from {}", source))
}
