//! Infrastructure layer module
//!
//! Cross-cutting plumbing that is not tied to a particular external system:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
