//! Renderers and file targets for buildchain.
//!
//! Provides:
//! - One renderer per [`Format`] (JSON, ENV, YAML)
//! - Atomic file writes (temp file, then rename)
//! - Targets for the external task runner ([`SerializedData`], [`Mkdir`])
//! - The pipeline document serializer

pub mod env;
pub mod json;
pub mod mkdir;
pub mod plan;
pub mod serialized;
mod write;
pub mod yaml;

use std::path::Path;

use buildchain_core::{Document, Format, RenderResult};
use tracing::debug;

pub use mkdir::Mkdir;
pub use plan::{emit_project, project_document, render_project};
pub use serialized::SerializedData;
pub use write::write_atomic;

/// Render `doc` into the bytes of `format`.
pub fn render(doc: &Document, format: Format) -> RenderResult<Vec<u8>> {
    let text = match format {
        Format::Json => json::render(doc)?,
        Format::Env => env::render(doc)?,
        Format::Yaml => yaml::render(doc),
    };
    Ok(text.into_bytes())
}

/// Render `doc` and atomically replace `path` with the result.
pub fn render_to_path(doc: &Document, format: Format, path: &Path) -> RenderResult<()> {
    let bytes = render(doc, format)?;
    write_atomic(path, &bytes)?;
    debug!(path = %path.display(), %format, bytes = bytes.len(), "Rendered file");
    Ok(())
}

/// Check that `doc` can be rendered as `format` at all.
pub fn check_payload(doc: &Document, format: Format) -> buildchain_core::Result<()> {
    match format {
        Format::Json | Format::Yaml => Ok(()),
        Format::Env => env::check(doc),
    }
}
