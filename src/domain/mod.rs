//! Domain layer for the change poller
//!
//! Core types, errors and the port traits that adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{SourceError, SourceResult};
