//! Domain errors for the change poller.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by the GitHub connector and by every [`Source`] variant.
///
/// The connector and the sources only ever return these to their caller;
/// deciding whether to log, retry or skip a tick is left to the scheduler.
///
/// [`Source`]: crate::domain::ports::Source
#[derive(Debug, Error)]
pub enum SourceError {
    /// The repository reference could not be parsed into `owner/name`.
    #[error("Invalid GitHub link: {0:?}")]
    InvalidLink(String),

    /// Transport-level failure (connect, timeout, reading the body).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote service answered with a non-2xx status.
    #[error("GitHub returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("Failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The core request budget is exhausted until `reset_at`.
    #[error("GitHub API rate limit exceeded{}", format_reset(.reset_at))]
    RateLimitExceeded { reset_at: Option<DateTime<Utc>> },

    /// `check_for_updates` was called before a successful `initialize`.
    #[error("Source '{0}' has not been initialized")]
    NotInitialized(String),
}

fn format_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|at| format!(" (resets at {})", at.to_rfc3339()))
        .unwrap_or_default()
}

impl SourceError {
    /// Returns true if the same call may succeed on a later tick.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimitExceeded { .. } | Self::NotInitialized(_) => true,
            Self::Remote { status, .. } => *status >= 500 || *status == 403 || *status == 429,
            Self::InvalidLink(_) | Self::Decode(_) => false,
        }
    }
}

/// Result alias used across the connector and the sources.
pub type SourceResult<T> = Result<T, SourceError>;
