//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "extra")]
#[command(about = "extra - watch GitHub issues and releases, notify a Teams channel", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to extra.yaml plus extra.local.yaml)
    #[arg(short, long, global = true, env = "EXTRA_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll all configured sources until interrupted
    Run {
        /// Check every source right after initialization
        #[arg(long)]
        immediate: bool,
    },

    /// Initialize every source and run a single poll
    Check,

    /// Validate the configuration and list the configured sources
    Validate {
        /// Also print the effective configuration, secrets redacted
        #[arg(long)]
        show: bool,
    },

    /// Show the current GitHub API quota
    Quota,
}
