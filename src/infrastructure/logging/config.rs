use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingConfig;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to stdout)
    pub log_dir: Option<PathBuf>,

    /// Log rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("Invalid log format: {other}")),
        }
    }
}

impl FromStr for RotationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "hourly" => Ok(Self::Hourly),
            "never" => Ok(Self::Never),
            other => Err(format!("Invalid log rotation: {other}")),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = String;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            level: config.level.clone(),
            format: config.format.parse()?,
            log_dir: config.log_dir.as_ref().map(PathBuf::from),
            rotation: config.rotation.parse()?,
        })
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Pretty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_logging_config() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "JSON".to_string(),
            log_dir: Some("/var/log/extra".to_string()),
            rotation: "hourly".to_string(),
        };
        let config = LogConfig::try_from(&logging).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/extra")));
        assert_eq!(config.rotation, RotationPolicy::Hourly);
    }

    #[test]
    fn test_rejects_unknown_values() {
        let logging = LoggingConfig {
            format: "xml".to_string(),
            ..LoggingConfig::default()
        };
        assert!(LogConfig::try_from(&logging).is_err());
        assert!("weekly".parse::<RotationPolicy>().is_err());
    }
}
