//! Release source.
//!
//! Tracks the latest release of a repository and reports when a different
//! release becomes the latest one.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::errors::{SourceError, SourceResult};
use crate::domain::models::{ChangeEvent, ChangeKind, RepositoryLocator};
use crate::domain::ports::Source;

use super::connector::Connector;
use super::models::GitHubRelease;

/// Last observed latest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSnapshot {
    /// Release id.
    pub id: u64,
    /// Release title (falls back to the tag when GitHub has none).
    pub name: String,
    /// Git tag.
    pub tag_name: String,
    /// Publication time.
    pub released_at: Option<DateTime<Utc>>,
    /// Release notes.
    pub description: String,
    /// Link to the release in the GitHub UI.
    pub url: String,
}

impl From<GitHubRelease> for ReleaseSnapshot {
    fn from(release: GitHubRelease) -> Self {
        let name = release
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| release.tag_name.clone());
        let url = if release.html_url.is_empty() {
            release.url
        } else {
            release.html_url
        };
        Self {
            id: release.id,
            name,
            tag_name: release.tag_name,
            released_at: release.published_at,
            description: release.body.unwrap_or_default(),
            url,
        }
    }
}

impl ReleaseSnapshot {
    fn summary(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "tag": self.tag_name,
            "url": self.url,
            "published_at": self.released_at.map(|t| t.to_rfc3339()),
        })
    }
}

/// Compare two latest-release snapshots.
///
/// Only the release id matters; edits to the notes of the same release
/// are not reported.
pub fn diff_release(
    source_name: &str,
    previous: &ReleaseSnapshot,
    current: &ReleaseSnapshot,
) -> Option<ChangeEvent> {
    (previous.id != current.id).then(|| {
        ChangeEvent::new(
            source_name,
            ChangeKind::NewRelease,
            previous.summary(),
            current.summary(),
        )
        .with_url(current.url.as_str())
    })
}

/// Source tracking the latest release of a repository.
#[derive(Debug)]
pub struct ReleaseSource {
    name: String,
    repository: RepositoryLocator,
    snapshot: Option<ReleaseSnapshot>,
    connector: Arc<Connector>,
}

impl ReleaseSource {
    /// Create a source for the repository behind `link`.
    pub fn new(
        name: impl Into<String>,
        link: &str,
        connector: Arc<Connector>,
    ) -> SourceResult<Self> {
        Ok(Self {
            name: name.into(),
            repository: RepositoryLocator::parse(link)?,
            snapshot: None,
            connector,
        })
    }

    /// The tracked repository.
    pub fn repository(&self) -> &RepositoryLocator {
        &self.repository
    }

    /// The last stored snapshot, if initialized.
    pub fn snapshot(&self) -> Option<&ReleaseSnapshot> {
        self.snapshot.as_ref()
    }

    async fn fetch(&self) -> SourceResult<ReleaseSnapshot> {
        let url = self.connector.api_url(&format!(
            "/repos/{}/{}/releases/latest",
            self.repository.owner(),
            self.repository.name()
        ));
        tracing::debug!(source = %self.name, url = %url, "Fetching latest release");

        let release: GitHubRelease = self.connector.get_json(&url).await?;
        Ok(release.into())
    }
}

#[async_trait]
impl Source for ReleaseSource {
    async fn initialize(&mut self) -> SourceResult<()> {
        let snapshot = self.fetch().await?;
        tracing::info!(
            source = %self.name,
            release_id = snapshot.id,
            tag = %snapshot.tag_name,
            "Release source initialized"
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

        let Some(event) = diff_release(&self.name, previous, &current) else {
            return Ok(Vec::new());
        };

        tracing::info!(
            source = %self.name,
            previous = %previous.tag_name,
            tag = %current.tag_name,
            "Detected new release"
        );
        self.snapshot = Some(current);
        Ok(vec![event])
    }

    fn identity(&self) -> &str {
        &self.name
    }

    fn is_initialized(&self) -> bool {
        self.snapshot.is_some()
    }

    fn describe(&self) -> String {
        format!("latest release of {}", self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: u64, tag: &str) -> ReleaseSnapshot {
        ReleaseSnapshot {
            id,
            name: format!("Release {tag}"),
            tag_name: tag.to_string(),
            released_at: DateTime::from_timestamp(1_361_993_732, 0),
            description: "notes".to_string(),
            url: format!("https://github.com/octocat/Hello-World/releases/{tag}"),
        }
    }

    #[test]
    fn test_same_id_no_event() {
        assert!(diff_release("rel", &snapshot(42, "v1"), &snapshot(42, "v1")).is_none());
    }

    #[test]
    fn test_body_edits_ignored() {
        let mut edited = snapshot(42, "v1");
        edited.description = "rewritten notes".to_string();
        edited.name = "Renamed".to_string();
        assert!(diff_release("rel", &snapshot(42, "v1"), &edited).is_none());
    }

    #[test]
    fn test_new_id_emits_release_event() {
        let event = diff_release("rel", &snapshot(42, "v1"), &snapshot(43, "v2")).unwrap();
        assert_eq!(event.kind, ChangeKind::NewRelease);
        assert_eq!(event.source_name, "rel");
        assert_eq!(event.new_value["tag"], "v2");
        assert_eq!(event.new_value["name"], "Release v2");
        assert_eq!(
            event.new_value["url"],
            "https://github.com/octocat/Hello-World/releases/v2"
        );
        assert_eq!(event.new_value["published_at"], "2013-02-27T19:35:32+00:00");
        assert_eq!(event.old_value["tag"], "v1");
        assert_eq!(
            event.url.as_deref(),
            Some("https://github.com/octocat/Hello-World/releases/v2")
        );
    }

    #[test]
    fn test_snapshot_falls_back_to_tag_and_api_url() {
        let release = GitHubRelease {
            id: 5,
            name: None,
            tag_name: "v0.5.0".to_string(),
            body: None,
            url: "https://api.github.com/repos/a/b/releases/5".to_string(),
            html_url: String::new(),
            published_at: None,
        };
        let snapshot = ReleaseSnapshot::from(release);
        assert_eq!(snapshot.name, "v0.5.0");
        assert_eq!(snapshot.description, "");
        assert_eq!(snapshot.url, "https://api.github.com/repos/a/b/releases/5");
        assert_eq!(snapshot.summary()["published_at"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_check_before_initialize_fails() {
        let connector = Arc::new(Connector::new("token").unwrap());
        let mut source = ReleaseSource::new("rel", "https://github.com/a/b", connector).unwrap();
        assert_eq!(source.describe(), "latest release of a/b");
        assert!(matches!(
            source.check_for_updates().await,
            Err(SourceError::NotInitialized(_))
        ));
    }
}
