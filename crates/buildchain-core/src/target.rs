//! Target contract exposed to the external task runner.
//!
//! A target owns its declared output paths. The runner decides ordering,
//! staleness and parallelism; a target only has to leave each output either
//! absent or completely written.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use derive_more::Display;
use serde::Serialize;
use tracing::debug;

use crate::{Error, RenderError, RenderResult, Result};

/// Stable identifier the task runner uses to refer to a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
#[display("{_0}")]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the task runner needs to know about a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSpec {
    pub id: TargetId,
    /// One-line label shown while the task runs.
    pub title: String,
    pub doc: String,
    /// Declared outputs, never empty.
    pub targets: Vec<PathBuf>,
    /// Files whose changes make this target stale.
    pub file_dep: Vec<PathBuf>,
    /// Targets that must complete first.
    pub task_dep: Vec<TargetId>,
}

impl TaskSpec {
    pub fn new(id: impl Into<TargetId>, targets: Vec<PathBuf>) -> Result<Self> {
        let id = id.into();
        if targets.is_empty() {
            return Err(Error::MissingField(format!("outputs of target '{}'", id)));
        }
        Ok(Self {
            id,
            title: String::new(),
            doc: String::new(),
            targets,
            file_dep: Vec::new(),
            task_dep: Vec::new(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_file_dep(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_dep.push(path.into());
        self
    }

    pub fn with_task_dep(mut self, id: impl Into<TargetId>) -> Self {
        self.task_dep.push(id.into());
        self
    }

    /// First declared output. `new` rejects an empty output list.
    pub fn primary_target(&self) -> &Path {
        &self.targets[0]
    }
}

/// A unit of work that produces its declared outputs atomically.
pub trait Target: Send + Sync {
    fn task(&self) -> &TaskSpec;

    /// Produce every declared output. Called at most once per build.
    fn execute(&self) -> RenderResult<()>;

    /// Remove previously produced outputs. Missing outputs are not an error.
    fn clean(&self) -> RenderResult<()> {
        for path in &self.task().targets {
            remove_path(path)?;
        }
        Ok(())
    }
}

/// Remove a file or directory tree, ignoring paths that do not exist.
pub fn remove_path(path: &Path) -> RenderResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(RenderError::io(path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => {
            debug!(path = %path.display(), "Removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RenderError::io(path, e)),
    }
}

/// Format a task title as `COMMAND` padded to a column, then the target.
pub fn title_with_target(command: &str, target: &Path) -> String {
    format!("{:<20} {}", command, target.display())
}
