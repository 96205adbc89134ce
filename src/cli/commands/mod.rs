//! CLI command implementations.

pub mod check;
pub mod quota;
pub mod run;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::github::{build_sources, Connector};
use crate::adapters::teams::TeamsNotifier;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::services::{PollScheduler, SchedulerConfig};

/// Load the explicit config file, or the default hierarchy.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load().context("Failed to load configuration"),
    }
}

/// Install the global subscriber described by the config.
pub(crate) fn init_logging(config: &Config) -> Result<LoggerImpl> {
    let log_config = LogConfig::try_from(&config.logging).map_err(anyhow::Error::msg)?;
    LoggerImpl::init(&log_config)
}

/// Wire the connector, sources and notifier into a scheduler.
pub(crate) fn build_scheduler(
    config: &Config,
    scheduler_config: SchedulerConfig,
) -> Result<PollScheduler> {
    let connector = Arc::new(
        Connector::from_config(&config.github).context("Failed to create GitHub connector")?,
    );
    let sources = build_sources(&config.sources, &connector)?;
    let notifier =
        TeamsNotifier::from_config(&config.teams).context("Failed to create Teams notifier")?;

    Ok(PollScheduler::new(Arc::new(notifier), scheduler_config).with_sources(sources))
}
