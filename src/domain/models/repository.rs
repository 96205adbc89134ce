//! Repository locator and GitHub link parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{SourceError, SourceResult};

const GITHUB_HOST: &str = "github.com";

/// Owner/name pair identifying a GitHub repository.
///
/// Built once from a user-supplied link and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryLocator {
    owner: String,
    name: String,
}

impl RepositoryLocator {
    /// Parse a repository link. See [`parse_link`].
    pub fn parse(link: &str) -> SourceResult<Self> {
        parse_link(link)
    }

    /// Repository owner (user or organisation).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Extract `(owner, name)` from a link of the form `github.com/owner/name`.
///
/// Surrounding whitespace and an `http://` or `https://` scheme are
/// stripped first. The remainder must start with `github.com` and contain
/// exactly two `/`. Case, trailing slashes and `.git` suffixes are left
/// untouched, so `github.com/a/b/` is rejected.
pub fn parse_link(link: &str) -> SourceResult<RepositoryLocator> {
    let trimmed = link.trim();
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or(trimmed);

    let invalid = || SourceError::InvalidLink(link.to_string());

    if !rest.starts_with(GITHUB_HOST) || rest.matches('/').count() != 2 {
        return Err(invalid());
    }

    let mut parts = rest.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(GITHUB_HOST), Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            Ok(RepositoryLocator {
                owner: owner.to_string(),
                name: name.to_string(),
            })
        }
        _ => Err(invalid()),
    }
}
