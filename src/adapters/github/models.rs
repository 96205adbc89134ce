//! GitHub REST API response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads. Only the
//! fields the sources need are declared; everything else is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `GET /repos/{owner}/{repo}/issues/{number}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    /// Unique numeric identifier for the issue.
    pub id: u64,
    /// Sequential number within the repository.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Current state: "open" or "closed".
    pub state: String,
    /// Whether conversation on the issue is locked.
    #[serde(default)]
    pub locked: bool,
    /// Reason given when locking (e.g. "resolved", "spam").
    #[serde(default)]
    pub active_lock_reason: Option<String>,
    /// Number of comments.
    #[serde(default)]
    pub comments: u64,
    /// URL to view the issue in the GitHub UI.
    #[serde(default)]
    pub html_url: String,
}

impl GitHubIssue {
    /// True when `state` is "closed".
    pub fn is_closed(&self) -> bool {
        self.state.eq_ignore_ascii_case("closed")
    }
}

/// Response of `GET /repos/{owner}/{repo}/releases/latest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRelease {
    /// Unique numeric identifier for the release.
    pub id: u64,
    /// Release title; GitHub returns null when none was set.
    #[serde(default)]
    pub name: Option<String>,
    /// Git tag the release points at.
    pub tag_name: String,
    /// Release notes.
    #[serde(default)]
    pub body: Option<String>,
    /// API URL of the release.
    #[serde(default)]
    pub url: String,
    /// URL to view the release in the GitHub UI.
    #[serde(default)]
    pub html_url: String,
    /// Publication time; null for drafts.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Response of `GET /rate_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResponse {
    /// Quota per API category.
    pub resources: RateLimitResources,
}

/// Quota categories reported by `GET /rate_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResources {
    /// The REST API budget every gated call draws from.
    pub core: RateLimitQuota,
    /// Search API budget.
    #[serde(default)]
    pub search: Option<RateLimitQuota>,
    /// GraphQL API budget.
    #[serde(default)]
    pub graphql: Option<RateLimitQuota>,
}

/// One quota bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitQuota {
    /// Requests allowed per window.
    pub limit: i64,
    /// Requests left in the current window.
    pub remaining: i64,
    /// Window reset, in seconds since the Unix epoch.
    pub reset: i64,
    /// Requests used in the current window.
    #[serde(default)]
    pub used: i64,
}

impl RateLimitQuota {
    /// The reset time as a timestamp.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset, 0)
    }
}
