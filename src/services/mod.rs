//! Service layer
//!
//! Coordinates sources and the notifier.

pub mod poll_scheduler;

pub use poll_scheduler::{
    PollScheduler, SchedulerConfig, SchedulerHandle, SchedulerStatus, SourceFailure, TickReport,
};
