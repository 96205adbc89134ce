//! Release source against a mock GitHub API.

mod common;

use common::{connector, link, release_body, release_path};
use extra::adapters::github::ReleaseSource;
use extra::domain::models::ChangeKind;
use extra::domain::ports::Source;
use mockito::Server;

#[tokio::test]
async fn test_same_release_yields_no_event() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", release_path().as_str())
        .with_status(200)
        .with_body(release_body(42, "v1.0.0"))
        .create_async()
        .await;

    let mut source = ReleaseSource::new("hello", &link(), connector(&server)).unwrap();
    source.initialize().await.unwrap();

    assert!(source.check_for_updates().await.unwrap().is_empty());
    assert_eq!(source.snapshot().unwrap().id, 42);
}

#[tokio::test]
async fn test_new_release_yields_one_event() {
    let mut server = Server::new_async().await;
    let old = server
        .mock("GET", release_path().as_str())
        .with_status(200)
        .with_body(release_body(42, "v1.0.0"))
        .create_async()
        .await;

    let mut source = ReleaseSource::new("hello", &link(), connector(&server)).unwrap();
    source.initialize().await.unwrap();
    old.remove_async().await;

    server
        .mock("GET", release_path().as_str())
        .with_status(200)
        .with_body(release_body(43, "v1.1.0"))
        .create_async()
        .await;

    let events = source.check_for_updates().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::NewRelease);
    assert_eq!(events[0].old_value["tag"], "v1.0.0");
    assert_eq!(events[0].new_value["tag"], "v1.1.0");
    assert_eq!(
        events[0].url.as_deref(),
        Some("https://github.com/octocat/Hello-World/releases/tag/v1.1.0")
    );
    assert_eq!(source.snapshot().unwrap().id, 43);

    assert!(source.check_for_updates().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_call_refreshes_quota() {
    let mut server = Server::new_async().await;
    let rate_limit = server
        .mock("GET", "/rate_limit")
        .with_status(200)
        .with_body(
            r#"{"resources":{"core":{"limit":5000,"remaining":10,"reset":1700000000,"used":4990}}}"#,
        )
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", release_path().as_str())
        .with_status(200)
        .with_body(release_body(42, "v1.0.0"))
        .create_async()
        .await;

    let connector = std::sync::Arc::new(
        extra::Connector::with_base_url(
            "test-token",
            &server.url(),
            std::time::Duration::from_secs(5),
        )
        .unwrap(),
    );
    let mut source = ReleaseSource::new("hello", &link(), std::sync::Arc::clone(&connector)).unwrap();

    source.initialize().await.unwrap();
    source.check_for_updates().await.unwrap();

    rate_limit.assert_async().await;
    // 10 remaining: one spent by initialize, one by the check.
    assert_eq!(connector.remaining_requests().await, 8);
}
