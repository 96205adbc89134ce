//! Implementation of the `extra run` command.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::services::SchedulerConfig;

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub ticks: u64,
    pub events_published: u64,
    pub failures: u64,
    pub last_tick: Option<DateTime<Utc>>,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        format!(
            "Stopped after {} poll(s): {} event(s) published, {} source failure(s)",
            self.ticks, self.events_published, self.failures
        )
    }
}

pub async fn execute(config_path: Option<&Path>, immediate: bool, json_mode: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let _logger = super::init_logging(&config)?;

    let scheduler_config = SchedulerConfig {
        run_on_startup: immediate,
        ..SchedulerConfig::from_hours(config.app.check_interval_hours)
    };
    let mut scheduler = super::build_scheduler(&config, scheduler_config)?;

    let init = scheduler.initialize_all().await;
    tracing::info!(
        sources = scheduler.source_names().len(),
        initialized = init.initialized,
        failed = init.failures.len(),
        "Sources initialized"
    );

    let handle = scheduler.handle();
    let task = tokio::spawn(scheduler.run());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested, finishing current poll");
    handle.stop();
    task.await.context("Scheduler task failed")?;

    let status = handle.status().await;
    output(
        &RunOutput {
            ticks: status.ticks,
            events_published: status.events_published,
            failures: status.failures,
            last_tick: status.last_tick,
        },
        json_mode,
    );
    Ok(())
}
