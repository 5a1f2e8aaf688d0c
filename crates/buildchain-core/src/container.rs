//! Container run configuration handed to the container engine.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::{Error, Result};

/// Where an entrypoint script is mounted inside the container.
pub const ENTRYPOINT_PATH: &str = "/entrypoint.sh";

/// A host path bound into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    /// Path on the host.
    pub source: PathBuf,
    /// Path inside the container.
    pub target: PathBuf,
    pub read_only: bool,
}

impl BindMount {
    /// A read-write bind of `source` at `target`.
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Docker `--volume` syntax: `source:target:ro|rw`.
    pub fn to_bind(&self) -> String {
        let mode = if self.read_only { "ro" } else { "rw" };
        format!(
            "{}:{}:{}",
            self.source.display(),
            self.target.display(),
            mode
        )
    }
}

/// Everything needed to start a build container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRun {
    pub image: String,
    pub command: Vec<String>,
    pub mounts: Vec<BindMount>,
    pub env: IndexMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

impl ContainerRun {
    pub fn new(image: impl Into<String>) -> Result<Self> {
        let image = image.into();
        if image.trim().is_empty() {
            return Err(Error::MissingField("container image".to_string()));
        }
        Ok(Self {
            image,
            command: Vec::new(),
            mounts: Vec::new(),
            env: IndexMap::new(),
            working_dir: None,
        })
    }

    /// Mount `script` read-only at [`ENTRYPOINT_PATH`] and run it.
    pub fn entrypoint(mut self, script: impl AsRef<Path>) -> Self {
        self.mounts
            .push(BindMount::new(script.as_ref(), ENTRYPOINT_PATH).read_only());
        self.command = vec![ENTRYPOINT_PATH.to_string()];
        self
    }

    pub fn command<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn mount(mut self, mount: BindMount) -> Self {
        self.mounts.push(mount);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Binds in Docker syntax, in mount order.
    pub fn binds(&self) -> Vec<String> {
        self.mounts.iter().map(BindMount::to_bind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_syntax() {
        let mount = BindMount::new("/host/ui", "/home/node/ui");
        assert_eq!(mount.to_bind(), "/host/ui:/home/node/ui:rw");
        assert_eq!(mount.read_only().to_bind(), "/host/ui:/home/node/ui:ro");
    }

    #[test]
    fn test_entrypoint_mounts_script() {
        let run = ContainerRun::new("ui-builder:latest")
            .unwrap()
            .entrypoint("/repo/ui/entrypoint.sh")
            .mount(BindMount::new("/repo/_build/ui", "/home/node/ui/build"));
        assert_eq!(run.command, vec!["/entrypoint.sh"]);
        assert_eq!(
            run.binds(),
            vec![
                "/repo/ui/entrypoint.sh:/entrypoint.sh:ro",
                "/repo/_build/ui:/home/node/ui/build:rw",
            ]
        );
    }

    #[test]
    fn test_image_required() {
        assert!(matches!(ContainerRun::new(""), Err(Error::MissingField(_))));
    }
}
