use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::{Config, SourceKind};
use crate::domain::models::parse_link;

/// Project config file, read from the working directory
pub const CONFIG_FILE: &str = "extra.yaml";

/// Optional local overrides, read after [`CONFIG_FILE`]
pub const LOCAL_CONFIG_FILE: &str = "extra.local.yaml";

/// Env var holding the Teams webhook URL
pub const ENV_TEAMS_WEBHOOK: &str = "EXTRA_TEAMS_WEBHOOK";

/// Env var holding the GitHub token
pub const ENV_GITHUB_TOKEN: &str = "EXTRA_GITHUB_TOKEN";

/// Env var holding the poll interval in hours
pub const ENV_UPDATE_INTERVAL: &str = "EXTRA_APP_INTERVAL";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GitHub auth token is not set (github.auth_token or EXTRA_GITHUB_TOKEN)")]
    MissingGithubToken,

    #[error("Teams webhook URL is not set (teams.webhook_url or EXTRA_TEAMS_WEBHOOK)")]
    MissingWebhookUrl,

    #[error("Invalid check_interval_hours: {0}. Must be at least 1")]
    InvalidInterval(u64),

    #[error("Invalid {0} request timeout: must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Source name cannot be empty")]
    EmptySourceName,

    #[error("Duplicate source name: {0}")]
    DuplicateSourceName(String),

    #[error("Source '{0}' has kind 'issue' but no issue number")]
    MissingIssueNumber(String),

    #[error("Source '{name}' has an invalid GitHub link: {link:?}")]
    InvalidSourceLink { name: String, link: String },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. extra.yaml (project config)
    /// 3. extra.local.yaml (local overrides, optional)
    /// 4. Nested environment variables (EXTRA_* prefix, `__` separated)
    /// 5. The flat variables EXTRA_GITHUB_TOKEN, EXTRA_TEAMS_WEBHOOK and
    ///    EXTRA_APP_INTERVAL
    pub fn load() -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE));

        Self::finish(figment)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path));

        Self::finish(figment)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn finish(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .merge(Self::nested_env())
            .merge(Self::flat_env())
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// `EXTRA_GITHUB__AUTH_TOKEN` style variables.
    fn nested_env() -> Env {
        Env::prefixed("EXTRA_")
            .filter(|key| key.as_str().contains("__"))
            .split("__")
    }

    /// The three flat variables, mapped onto their config keys.
    fn flat_env() -> Env {
        Env::raw()
            .only(&[ENV_GITHUB_TOKEN, ENV_TEAMS_WEBHOOK, ENV_UPDATE_INTERVAL])
            .map(|key| {
                if key.as_str().eq_ignore_ascii_case(ENV_GITHUB_TOKEN) {
                    "github.auth_token".into()
                } else if key.as_str().eq_ignore_ascii_case(ENV_TEAMS_WEBHOOK) {
                    "teams.webhook_url".into()
                } else {
                    "app.check_interval_hours".into()
                }
            })
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.github.auth_token.trim().is_empty() {
            return Err(ConfigError::MissingGithubToken);
        }

        if config.teams.webhook_url.trim().is_empty() {
            return Err(ConfigError::MissingWebhookUrl);
        }

        if config.app.check_interval_hours == 0 {
            return Err(ConfigError::InvalidInterval(config.app.check_interval_hours));
        }

        if config.github.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("github"));
        }

        if config.teams.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("teams"));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        // Validate sources
        let mut seen = HashSet::new();
        for source in &config.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::EmptySourceName);
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSourceName(source.name.clone()));
            }
            if source.kind == SourceKind::Issue && source.issue.is_none() {
                return Err(ConfigError::MissingIssueNumber(source.name.clone()));
            }
            if parse_link(&source.link).is_err() {
                return Err(ConfigError::InvalidSourceLink {
                    name: source.name.clone(),
                    link: source.link.clone(),
                });
            }
        }

        Ok(())
    }
}
