//! GitHub sources.
//!
//! A shared quota-gated [`Connector`] plus one [`Source`] implementation
//! per kind of tracked entity: single issues and latest releases.

pub mod connector;
pub mod issue_source;
pub mod models;
pub mod release_source;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::domain::models::{SourceConfig, SourceKind};
use crate::domain::ports::Source;

pub use connector::Connector;
pub use issue_source::{IssueSnapshot, IssueSource};
pub use release_source::{ReleaseSnapshot, ReleaseSource};

/// Build a source from its configuration entry.
///
/// # Errors
///
/// Returns `Err` if the link is invalid or an issue source has no
/// issue number.
pub fn build_source(config: &SourceConfig, connector: Arc<Connector>) -> Result<Box<dyn Source>> {
    let source: Box<dyn Source> = match config.kind {
        SourceKind::Issue => {
            let issue = config
                .issue
                .ok_or_else(|| anyhow!("Source '{}' has kind 'issue' but no issue number", config.name))?;
            Box::new(
                IssueSource::new(config.name.clone(), &config.link, issue, connector)
                    .with_context(|| format!("Failed to create source '{}'", config.name))?,
            )
        }
        SourceKind::Release => Box::new(
            ReleaseSource::new(config.name.clone(), &config.link, connector)
                .with_context(|| format!("Failed to create source '{}'", config.name))?,
        ),
    };
    Ok(source)
}

/// Build every configured source, sharing one connector.
pub fn build_sources(
    configs: &[SourceConfig],
    connector: &Arc<Connector>,
) -> Result<Vec<Box<dyn Source>>> {
    configs
        .iter()
        .map(|config| build_source(config, Arc::clone(connector)))
        .collect()
}
