//! Repository link parsing through the public API.

use extra::{parse_link, SourceError};

#[test]
fn test_parse_https_link() {
    let repo = parse_link("https://github.com/octocat/Hello-World").unwrap();
    assert_eq!(repo.owner(), "octocat");
    assert_eq!(repo.name(), "Hello-World");
}

#[test]
fn test_parse_trims_whitespace() {
    let repo = parse_link("  github.com/a/b  ").unwrap();
    assert_eq!((repo.owner(), repo.name()), ("a", "b"));
}

#[test]
fn test_parse_rejects_extra_segments() {
    let err = parse_link("github.com/a/b/c").unwrap_err();
    assert!(matches!(err, SourceError::InvalidLink(ref link) if link == "github.com/a/b/c"));
}

#[test]
fn test_parse_rejects_other_hosts() {
    assert!(parse_link("https://gitlab.com/a/b").is_err());
    assert!(parse_link("").is_err());
}
