//! Implementation of the `extra check` command.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::ChangeEvent;
use crate::services::{SchedulerConfig, SourceFailure};

#[derive(Debug, Serialize)]
pub struct FailureRow {
    pub source: String,
    pub error: String,
    pub retryable: bool,
}

impl From<&SourceFailure> for FailureRow {
    fn from(failure: &SourceFailure) -> Self {
        Self {
            source: failure.source.clone(),
            error: failure.error.to_string(),
            retryable: failure.error.is_retryable(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub sources: usize,
    pub initialized: usize,
    pub checked: usize,
    pub events: Vec<ChangeEvent>,
    pub failures: Vec<FailureRow>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} source(s): {} initialized, {} checked, {} event(s), {} failure(s)",
            self.sources,
            self.initialized,
            self.checked,
            self.events.len(),
            self.failures.len()
        )];

        if !self.events.is_empty() {
            let mut table = list_table(&["source", "change", "old", "new"]);
            for event in &self.events {
                table.add_row(vec![
                    event.source_name.clone(),
                    event.kind.to_string(),
                    truncate(&event.old_value.to_string(), 40),
                    truncate(&event.new_value.to_string(), 40),
                ]);
            }
            lines.push(format!("\n{table}"));
        }

        if !self.failures.is_empty() {
            let mut table = list_table(&["source", "error", "retryable"]);
            for failure in &self.failures {
                table.add_row(vec![
                    failure.source.clone(),
                    truncate(&failure.error, 80),
                    failure.retryable.to_string(),
                ]);
            }
            lines.push(format!("\n{table}"));
        }

        lines.join("\n")
    }
}

pub async fn execute(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let _logger = super::init_logging(&config)?;

    let mut scheduler = super::build_scheduler(
        &config,
        SchedulerConfig::from_hours(config.app.check_interval_hours),
    )?;

    let init = scheduler.initialize_all().await;
    let tick = scheduler.tick().await;

    // A source that failed to initialize is retried by the tick; only
    // report it once.
    let mut failures: Vec<FailureRow> = tick.failures.iter().map(FailureRow::from).collect();
    for failure in &init.failures {
        if !failures.iter().any(|f| f.source == failure.source) {
            failures.push(FailureRow::from(failure));
        }
    }

    let result = CheckOutput {
        sources: scheduler.source_names().len(),
        initialized: init.initialized + tick.initialized,
        checked: tick.checked,
        events: tick.events,
        failures,
    };
    output(&result, json_mode);

    if !result.failures.is_empty() {
        anyhow::bail!("{} source(s) failed", result.failures.len());
    }
    Ok(())
}
