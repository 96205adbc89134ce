//! Implementation of the `extra quota` command.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapters::github::models::{RateLimitQuota, RateLimitResponse};
use crate::adapters::github::Connector;
use crate::cli::output::{list_table, output, CommandOutput};

#[derive(Debug, Serialize)]
pub struct QuotaRow {
    pub resource: String,
    pub limit: i64,
    pub remaining: i64,
    pub used: i64,
    pub reset_at: Option<DateTime<Utc>>,
}

impl QuotaRow {
    fn new(resource: &str, quota: &RateLimitQuota) -> Self {
        Self {
            resource: resource.to_string(),
            limit: quota.limit,
            remaining: quota.remaining,
            used: quota.used,
            reset_at: quota.reset_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuotaOutput {
    pub resources: Vec<QuotaRow>,
}

impl From<&RateLimitResponse> for QuotaOutput {
    fn from(response: &RateLimitResponse) -> Self {
        let resources = &response.resources;
        let mut rows = vec![QuotaRow::new("core", &resources.core)];
        if let Some(search) = &resources.search {
            rows.push(QuotaRow::new("search", search));
        }
        if let Some(graphql) = &resources.graphql {
            rows.push(QuotaRow::new("graphql", graphql));
        }
        Self { resources: rows }
    }
}

impl CommandOutput for QuotaOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["resource", "limit", "remaining", "used", "resets"]);
        for row in &self.resources {
            table.add_row(vec![
                row.resource.clone(),
                row.limit.to_string(),
                row.remaining.to_string(),
                row.used.to_string(),
                row.reset_at
                    .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            ]);
        }
        table.to_string()
    }
}

pub async fn execute(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let connector =
        Connector::from_config(&config.github).context("Failed to create GitHub connector")?;

    let response = connector
        .fetch_rate_limit()
        .await
        .context("Failed to fetch GitHub rate limit")?;

    output(&QuotaOutput::from(&response), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::github::models::RateLimitResources;

    #[test]
    fn test_quota_output_skips_missing_categories() {
        let response = RateLimitResponse {
            resources: RateLimitResources {
                core: RateLimitQuota {
                    limit: 5000,
                    remaining: 4990,
                    reset: 1_700_000_000,
                    used: 10,
                },
                search: None,
                graphql: None,
            },
        };

        let out = QuotaOutput::from(&response);
        assert_eq!(out.resources.len(), 1);
        assert_eq!(out.resources[0].resource, "core");
        assert!(out.to_human().contains("4990"));
        assert_eq!(out.to_json()["resources"][0]["remaining"], 4990);
    }
}
