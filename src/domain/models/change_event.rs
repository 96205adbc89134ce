//! Change events emitted by sources.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What kind of transition a [`ChangeEvent`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// An issue was closed or reopened.
    IssueStateChanged,
    /// An issue was locked or unlocked.
    IssueLockChanged,
    /// New comments were posted on an issue.
    NewComments,
    /// A new latest release was published.
    NewRelease,
}

impl ChangeKind {
    /// Short human-readable title, used in notification cards.
    pub fn title(self) -> &'static str {
        match self {
            Self::IssueStateChanged => "Issue state changed",
            Self::IssueLockChanged => "Issue lock changed",
            Self::NewComments => "New comments",
            Self::NewRelease => "New release",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IssueStateChanged => "issue_state_changed",
            Self::IssueLockChanged => "issue_lock_changed",
            Self::NewComments => "new_comments",
            Self::NewRelease => "new_release",
        };
        f.write_str(s)
    }
}

/// One detected difference between two snapshots of a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Name of the source that produced the event.
    pub source_name: String,
    /// Kind of transition.
    pub kind: ChangeKind,
    /// Value before the transition.
    pub old_value: Value,
    /// Value after the transition (for [`ChangeKind::NewComments`], the delta).
    pub new_value: Value,
    /// Link to the changed entity on GitHub, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// When the difference was observed.
    pub detected_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create an event stamped with the current time.
    pub fn new(
        source_name: impl Into<String>,
        kind: ChangeKind,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            kind,
            old_value,
            new_value,
            url: None,
            detected_at: Utc::now(),
        }
    }

    /// Attach a link to the changed entity. Empty links are ignored.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.is_empty() {
            self.url = Some(url);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ChangeKind::NewComments).unwrap();
        assert_eq!(json, "\"new_comments\"");
        assert_eq!(ChangeKind::IssueLockChanged.to_string(), "issue_lock_changed");
    }

    #[test]
    fn test_event_serialization() {
        let event = ChangeEvent::new("hello", ChangeKind::NewComments, json!(3), json!(2));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["source_name"], "hello");
        assert_eq!(value["kind"], "new_comments");
        assert_eq!(value["old_value"], 3);
        assert_eq!(value["new_value"], 2);
        assert!(value["detected_at"].is_string());
    }

    #[test]
    fn test_with_url() {
        let event = ChangeEvent::new("rel", ChangeKind::NewRelease, Value::Null, json!({}))
            .with_url("https://github.com/a/b/releases/tag/v1");
        assert_eq!(event.url.as_deref(), Some("https://github.com/a/b/releases/tag/v1"));

        let empty = ChangeEvent::new("issue", ChangeKind::NewComments, json!(1), json!(1))
            .with_url("");
        assert!(empty.url.is_none());
        assert!(!serde_json::to_string(&empty).unwrap().contains("\"url\""));
    }
}
