//! Common test utilities for integration tests
//!
//! Fixtures for standing a mockito server in for the GitHub API.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use extra::adapters::github::Connector;
use extra::domain::models::ChangeEvent;
use extra::domain::ports::Notifier;
use serde_json::{json, Value};

pub const OWNER: &str = "octocat";
pub const REPO: &str = "Hello-World";
pub const ISSUE: u64 = 1347;

pub fn issue_path() -> String {
    format!("/repos/{OWNER}/{REPO}/issues/{ISSUE}")
}

pub fn release_path() -> String {
    format!("/repos/{OWNER}/{REPO}/releases/latest")
}

pub fn link() -> String {
    format!("https://github.com/{OWNER}/{REPO}")
}

/// Connector pointed at the mock server with a budget that needs no refresh.
pub fn connector(server: &mockito::Server) -> Arc<Connector> {
    Arc::new(
        Connector::with_base_url("test-token", &server.url(), Duration::from_secs(5))
            .expect("Failed to build connector")
            .with_remaining_requests(1_000),
    )
}

pub fn issue_body(closed: bool, locked: bool, comments: u64) -> String {
    json!({
        "id": 1,
        "number": ISSUE,
        "title": "Found a bug",
        "state": if closed { "closed" } else { "open" },
        "locked": locked,
        "active_lock_reason": if locked { Value::from("resolved") } else { Value::Null },
        "comments": comments,
        "html_url": format!("https://github.com/{OWNER}/{REPO}/issues/{ISSUE}"),
    })
    .to_string()
}

pub fn release_body(id: u64, tag: &str) -> String {
    json!({
        "id": id,
        "name": format!("Release {tag}"),
        "tag_name": tag,
        "body": "Notes",
        "url": format!("https://api.github.com/repos/{OWNER}/{REPO}/releases/{id}"),
        "html_url": format!("https://github.com/{OWNER}/{REPO}/releases/tag/{tag}"),
        "published_at": "2024-05-01T12:00:00Z",
    })
    .to_string()
}

/// Notifier that keeps every event it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, _payload: Vec<u8>) {}

    async fn notify(&self, event: &ChangeEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}
