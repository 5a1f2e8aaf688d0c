//! Target that renders a document into a file.

use std::path::{Path, PathBuf};

use buildchain_core::target::title_with_target;
use buildchain_core::{Document, Format, RenderResult, Result, Target, TargetId, TaskSpec};
use tracing::info;

use crate::{check_payload, render_to_path};

/// Serialize a [`Document`] into a file with one of the renderers.
#[derive(Debug, Clone)]
pub struct SerializedData {
    task: TaskSpec,
    data: Document,
    destination: PathBuf,
    format: Format,
}

impl SerializedData {
    /// Configure a render target. The payload is checked against `format`
    /// here, so incompatible data fails during plan assembly.
    pub fn new(
        data: impl Into<Document>,
        destination: impl Into<PathBuf>,
        format: Format,
    ) -> Result<Self> {
        let data = data.into();
        let destination = destination.into();
        check_payload(&data, format)?;

        let task = TaskSpec::new(
            destination.display().to_string(),
            vec![destination.clone()],
        )?
        .with_title(title_with_target(&format!("RENDER {}", format), &destination))
        .with_doc(format!(
            "Render file \"{}\" with \"{}\"",
            destination.display(),
            format
        ));

        Ok(Self {
            task,
            data,
            destination,
            format,
        })
    }

    /// Use `id` instead of the destination path as the task identifier.
    pub fn with_id(mut self, id: impl Into<TargetId>) -> Self {
        self.task.id = id.into();
        self
    }

    pub fn with_file_dep(mut self, path: impl Into<PathBuf>) -> Self {
        self.task = self.task.with_file_dep(path);
        self
    }

    pub fn with_task_dep(mut self, id: impl Into<TargetId>) -> Self {
        self.task = self.task.with_task_dep(id);
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn data(&self) -> &Document {
        &self.data
    }
}

impl Target for SerializedData {
    fn task(&self) -> &TaskSpec {
        &self.task
    }

    fn execute(&self) -> RenderResult<()> {
        info!(
            target_id = %self.task.id,
            path = %self.destination.display(),
            format = %self.format,
            "Rendering"
        );
        render_to_path(&self.data, self.format, &self.destination)
    }
}
