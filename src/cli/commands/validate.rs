//! Implementation of the `extra validate` command.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{parse_link, Config, SourceKind};

const REDACTED: &str = "********";

#[derive(Debug, Serialize)]
pub struct SourceRow {
    pub name: String,
    pub kind: SourceKind,
    pub repository: String,
    pub issue: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub valid: bool,
    pub api_base_url: String,
    pub check_interval_hours: u64,
    pub sources: Vec<SourceRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_config: Option<Config>,
}

impl From<&Config> for ValidateOutput {
    fn from(config: &Config) -> Self {
        let sources = config
            .sources
            .iter()
            .map(|source| SourceRow {
                name: source.name.clone(),
                kind: source.kind,
                repository: parse_link(&source.link)
                    .map_or_else(|_| source.link.clone(), |repo| repo.to_string()),
                issue: source.issue,
            })
            .collect();

        Self {
            valid: true,
            api_base_url: config.github.api_base_url.clone(),
            check_interval_hours: config.app.check_interval_hours,
            sources,
            effective_config: None,
        }
    }
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["name", "kind", "repository", "issue"]);
        for source in &self.sources {
            table.add_row(vec![
                source.name.clone(),
                source.kind.to_string(),
                source.repository.clone(),
                source.issue.map_or_else(|| "-".to_string(), |n| format!("#{n}")),
            ]);
        }

        let mut text = format!(
            "Configuration is valid. Polling {} every {} hour(s).\n\n{}",
            self.api_base_url,
            self.check_interval_hours,
            render_list("source", &table, self.sources.len())
        );

        if let Some(config) = &self.effective_config {
            match serde_yaml::to_string(config) {
                Ok(yaml) => text.push_str(&format!("\n\nEffective configuration:\n{yaml}")),
                Err(e) => text.push_str(&format!("\n\nFailed to render configuration: {e}")),
            }
        }

        text
    }
}

/// Copy of the config with credentials masked.
pub fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if !config.github.auth_token.is_empty() {
        config.github.auth_token = REDACTED.to_string();
    }
    if !config.teams.webhook_url.is_empty() {
        config.teams.webhook_url = REDACTED.to_string();
    }
    config
}

pub fn execute(config_path: Option<&Path>, show: bool, json_mode: bool) -> Result<()> {
    let config = super::load_config(config_path).context("Configuration is invalid")?;

    let mut result = ValidateOutput::from(&config);
    if show {
        result.effective_config = Some(redacted(&config));
    }
    output(&result, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SourceConfig;

    fn config() -> Config {
        let mut config = Config {
            sources: vec![
                SourceConfig {
                    name: "hello".to_string(),
                    kind: SourceKind::Issue,
                    link: "https://github.com/octocat/Hello-World".to_string(),
                    issue: Some(1347),
                },
                SourceConfig {
                    name: "tokio".to_string(),
                    kind: SourceKind::Release,
                    link: "github.com/tokio-rs/tokio".to_string(),
                    issue: None,
                },
            ],
            ..Config::default()
        };
        config.github.auth_token = "ghp_secret".to_string();
        config.teams.webhook_url = "https://example.webhook.office.com/secret".to_string();
        config
    }

    #[test]
    fn test_validate_output_lists_sources() {
        let out = ValidateOutput::from(&config());
        assert_eq!(out.sources[0].repository, "octocat/Hello-World");
        assert_eq!(out.sources[1].repository, "tokio-rs/tokio");

        let human = out.to_human();
        assert!(human.contains("2 sources:"));
        assert!(human.contains("#1347"));
        assert!(!human.contains("Effective configuration"));

        let json = out.to_json();
        assert_eq!(json["sources"][1]["kind"], "release");
        assert!(json.get("effective_config").is_none());
    }

    #[test]
    fn test_effective_config_is_redacted() {
        let mut out = ValidateOutput::from(&config());
        out.effective_config = Some(redacted(&config()));

        let human = out.to_human();
        assert!(human.contains("Effective configuration:"));
        assert!(human.contains(REDACTED));
        assert!(!human.contains("ghp_secret"));
        assert!(!human.contains("/secret"));

        let json = out.to_json();
        assert_eq!(json["effective_config"]["github"]["auth_token"], REDACTED);
    }

    #[test]
    fn test_redacted_leaves_empty_secrets_empty() {
        let config = redacted(&Config::default());
        assert!(config.github.auth_token.is_empty());
        assert!(config.teams.webhook_url.is_empty());
    }
}
