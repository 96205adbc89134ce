//! Adapters for external systems.
//!
//! - `github`: the quota-gated connector and the issue/release sources
//! - `teams`: the webhook notifier

pub mod github;
pub mod teams;
