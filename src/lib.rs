//! extra - GitHub change poller
//!
//! Watches GitHub issues and releases and posts a card to a Microsoft Teams
//! channel whenever something changes.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): change events, repository links, the
//!   `Source` and `Notifier` ports
//! - **Adapters** (`adapters`): the rate-limited GitHub connector with its
//!   issue and release sources, and the Teams webhook notifier
//! - **Service Layer** (`services`): the poll scheduler
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use extra::adapters::github::{Connector, ReleaseSource};
//! use extra::adapters::teams::TeamsNotifier;
//! use extra::services::{PollScheduler, SchedulerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let connector = Arc::new(Connector::new("ghp_token")?);
//!     let source = ReleaseSource::new("tokio", "github.com/tokio-rs/tokio", connector)?;
//!     let notifier = TeamsNotifier::new(
//!         "https://example.webhook.office.com/webhook",
//!         std::time::Duration::from_secs(30),
//!     )?;
//!
//!     let mut scheduler = PollScheduler::new(Arc::new(notifier), SchedulerConfig::from_hours(1));
//!     scheduler.register(Box::new(source));
//!     scheduler.initialize_all().await;
//!     scheduler.run().await;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::github::{build_sources, Connector, IssueSource, ReleaseSource};
pub use adapters::teams::TeamsNotifier;
pub use domain::models::{
    parse_link, ChangeEvent, ChangeKind, Config, RepositoryLocator, SourceConfig, SourceKind,
};
pub use domain::ports::{Notifier, Source};
pub use domain::{SourceError, SourceResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{PollScheduler, SchedulerConfig, SchedulerHandle, TickReport};
