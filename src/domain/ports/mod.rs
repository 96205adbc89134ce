//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - Source: a tracked GitHub entity that can detect its own changes
//! - Notifier: a channel that change notifications are published to
//!
//! These traits keep the scheduler independent of GitHub and Teams.

pub mod notifier;
pub mod source;

pub use notifier::Notifier;
pub use source::Source;
