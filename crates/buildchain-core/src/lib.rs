//! Core domain types and traits for buildchain.
//!
//! This crate contains:
//! - The document model rendered into files
//! - The pipeline graph (projects, stages, workers, steps)
//! - The target contract shared with the external task runner
//! - Container run configuration

pub mod container;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod target;

pub use document::{Document, Format, Mapping};
pub use error::{Error, RenderError, RenderResult, Result, SerializationError};
pub use target::{Target, TargetId, TaskSpec};
