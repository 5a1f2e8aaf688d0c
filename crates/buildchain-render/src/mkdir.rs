//! Directory creation target.

use std::fs;
use std::path::{Path, PathBuf};

use buildchain_core::target::title_with_target;
use buildchain_core::{RenderError, RenderResult, Result, Target, TargetId, TaskSpec};
use tracing::info;

/// Create a directory (and its parents).
#[derive(Debug, Clone)]
pub struct Mkdir {
    task: TaskSpec,
    directory: PathBuf,
}

impl Mkdir {
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        let task = TaskSpec::new(
            format!("mkdir:{}", directory.display()),
            vec![directory.clone()],
        )?
        .with_title(title_with_target("MKDIR", &directory))
        .with_doc(format!("Create directory \"{}\"", directory.display()));
        Ok(Self { task, directory })
    }

    pub fn with_task_dep(mut self, id: impl Into<TargetId>) -> Self {
        self.task = self.task.with_task_dep(id);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Target for Mkdir {
    fn task(&self) -> &TaskSpec {
        &self.task
    }

    fn execute(&self) -> RenderResult<()> {
        info!(path = %self.directory.display(), "Creating directory");
        fs::create_dir_all(&self.directory).map_err(|e| RenderError::io(&self.directory, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_and_cleans_tree() {
        let dir = tempfile::tempdir().unwrap();
        let build_root = dir.path().join("_build").join("ui");
        let target = Mkdir::new(&build_root).unwrap().with_task_dep("_build_root");

        target.execute().unwrap();
        assert!(build_root.is_dir());
        // Idempotent.
        target.execute().unwrap();

        fs::write(build_root.join("index.html"), b"<html/>").unwrap();
        target.clean().unwrap();
        assert!(!build_root.exists());
        assert!(dir.path().join("_build").exists());
        assert_eq!(target.task().task_dep, vec![TargetId::new("_build_root")]);
    }
}
