//! Issue source.
//!
//! Tracks a single issue and reports when it is closed or reopened,
//! locked or unlocked, or receives new comments.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::errors::{SourceError, SourceResult};
use crate::domain::models::{ChangeEvent, ChangeKind, RepositoryLocator};
use crate::domain::ports::Source;

use super::connector::Connector;
use super::models::GitHubIssue;

/// Last observed state of an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSnapshot {
    /// Issue number within the repository.
    pub id: u64,
    /// Whether the issue is closed.
    pub closed: bool,
    /// Number of comments.
    pub comment_count: u64,
    /// Whether conversation is locked.
    pub locked: bool,
    /// Lock reason; only meaningful while `locked`.
    pub locked_reason: Option<String>,
    /// Issue title.
    pub name: String,
    /// Link to the issue in the GitHub UI.
    pub url: String,
}

impl From<GitHubIssue> for IssueSnapshot {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            id: issue.number,
            closed: issue.is_closed(),
            comment_count: issue.comments,
            locked: issue.locked,
            locked_reason: issue.active_lock_reason,
            name: issue.title,
            url: issue.html_url,
        }
    }
}

impl IssueSnapshot {
    fn state_label(&self) -> &'static str {
        if self.closed {
            "closed"
        } else {
            "open"
        }
    }

    fn lock_value(&self) -> serde_json::Value {
        let reason = if self.locked {
            self.locked_reason.as_deref()
        } else {
            None
        };
        json!({ "locked": self.locked, "reason": reason })
    }
}

/// Compare two snapshots of the same issue.
///
/// Each rule fires independently; events come back in the order state,
/// lock, comments. A drop in the comment count (deleted comments) is
/// not reported.
pub fn diff_issue(
    source_name: &str,
    previous: &IssueSnapshot,
    current: &IssueSnapshot,
) -> Vec<ChangeEvent> {
    let mut events = Vec::new();

    if previous.closed != current.closed {
        events.push(
            ChangeEvent::new(
                source_name,
                ChangeKind::IssueStateChanged,
                json!(previous.state_label()),
                json!(current.state_label()),
            )
            .with_url(current.url.as_str()),
        );
    }

    if previous.locked != current.locked {
        events.push(
            ChangeEvent::new(
                source_name,
                ChangeKind::IssueLockChanged,
                previous.lock_value(),
                current.lock_value(),
            )
            .with_url(current.url.as_str()),
        );
    }

    if current.comment_count > previous.comment_count {
        events.push(
            ChangeEvent::new(
                source_name,
                ChangeKind::NewComments,
                json!(previous.comment_count),
                json!(current.comment_count - previous.comment_count),
            )
            .with_url(current.url.as_str()),
        );
    }

    events
}

/// Source tracking one issue of a repository.
#[derive(Debug)]
pub struct IssueSource {
    name: String,
    repository: RepositoryLocator,
    issue: u64,
    snapshot: Option<IssueSnapshot>,
    connector: Arc<Connector>,
}

impl IssueSource {
    /// Create a source for issue `issue` of the repository behind `link`.
    ///
    /// Fails with [`SourceError::InvalidLink`] when `link` is not a
    /// `github.com/owner/name` reference.
    pub fn new(
        name: impl Into<String>,
        link: &str,
        issue: u64,
        connector: Arc<Connector>,
    ) -> SourceResult<Self> {
        Ok(Self {
            name: name.into(),
            repository: RepositoryLocator::parse(link)?,
            issue,
            snapshot: None,
            connector,
        })
    }

    /// The tracked repository.
    pub fn repository(&self) -> &RepositoryLocator {
        &self.repository
    }

    /// The tracked issue number.
    pub fn issue(&self) -> u64 {
        self.issue
    }

    /// The last stored snapshot, if initialized.
    pub fn snapshot(&self) -> Option<&IssueSnapshot> {
        self.snapshot.as_ref()
    }

    async fn fetch(&self) -> SourceResult<IssueSnapshot> {
        let url = self.connector.api_url(&format!(
            "/repos/{}/{}/issues/{}",
            self.repository.owner(),
            self.repository.name(),
            self.issue
        ));
        tracing::debug!(source = %self.name, url = %url, "Fetching issue");

        let issue: GitHubIssue = self.connector.get_json(&url).await?;
        Ok(issue.into())
    }
}

#[async_trait]
impl Source for IssueSource {
    async fn initialize(&mut self) -> SourceResult<()> {
        let snapshot = self.fetch().await?;
        tracing::info!(
            source = %self.name,
            issue = snapshot.id,
            title = %snapshot.name,
            closed = snapshot.closed,
            comments = snapshot.comment_count,
            "Issue source initialized"
        );
        self.snapshot = Some(snapshot);
        Ok(())
    }

    async fn check_for_updates(&mut self) -> SourceResult<Vec<ChangeEvent>> {
        if self.snapshot.is_none() {
            return Err(SourceError::NotInitialized(self.name.clone()));
        }

        let current = self.fetch().await?;
        let previous = self
            .snapshot
            .as_ref()
            .ok_or_else(|| SourceError::NotInitialized(self.name.clone()))?;
        let events = diff_issue(&self.name, previous, &current);
        self.snapshot = Some(current);

        if !events.is_empty() {
            tracing::info!(
                source = %self.name,
                issue = self.issue,
                count = events.len(),
                "Detected issue changes"
            );
        }
        Ok(events)
    }

    fn identity(&self) -> &str {
        &self.name
    }

    fn is_initialized(&self) -> bool {
        self.snapshot.is_some()
    }

    fn describe(&self) -> String {
        format!("issue #{} in {}", self.issue, self.repository)
    }
}
