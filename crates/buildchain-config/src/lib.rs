//! Configuration loading for buildchain.
//!
//! This crate handles:
//! - Build plan definitions (buildplan.kdl) parsed into a pipeline project
//! - Payload documents for render targets (JSON or YAML files)

pub mod data;
pub mod error;
pub mod pipeline;

pub use data::load_document;
pub use error::{ConfigError, ConfigResult};
pub use pipeline::{load_project, parse_project};
