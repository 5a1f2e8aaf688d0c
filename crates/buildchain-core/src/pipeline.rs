//! Pipeline graph: projects, stages, workers and steps.
//!
//! Nodes are immutable values built bottom-up. A [`Step::TriggerStages`]
//! owns its child stages outright, so the stage tree cannot contain cycles.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexSet;

use crate::{Error, Result};

/// A complete pipeline: top-level stages in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    stages: Vec<Stage>,
}

impl Project {
    /// Assemble a project, rejecting stage names that appear twice anywhere
    /// in the tree (including stages nested under trigger steps).
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        let project = Self { stages };
        let mut seen = HashSet::new();
        for stage in project.walk() {
            if !seen.insert(stage.name()) {
                return Err(Error::Duplicate(format!("stage '{}'", stage.name())));
            }
        }
        Ok(project)
    }

    /// Return a new project with `stage` appended.
    pub fn with_stage(self, stage: Stage) -> Result<Self> {
        let mut stages = self.stages;
        stages.push(stage);
        Self::new(stages)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Every stage in the tree, depth-first in declaration order.
    pub fn walk(&self) -> Vec<&Stage> {
        fn visit<'a>(stages: &'a [Stage], out: &mut Vec<&'a Stage>) {
            for stage in stages {
                out.push(stage);
                for step in stage.steps() {
                    if let Step::TriggerStages(trigger) = step {
                        visit(trigger.stages(), out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        visit(&self.stages, &mut out);
        out
    }

    /// Look up a stage anywhere in the tree.
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.walk().into_iter().find(|s| s.name() == name)
    }

    /// Top-level stages whose branch filters accept `branch`.
    pub fn stages_for_branch(&self, branch: &str) -> Vec<&Stage> {
        self.stages.iter().filter(|s| s.runs_on(branch)).collect()
    }
}

/// A named unit of work bound to a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    name: String,
    worker: Worker,
    branches: IndexSet<String>,
    steps: Vec<Step>,
}

impl Stage {
    pub fn builder(name: impl Into<String>, worker: Worker) -> StageBuilder {
        StageBuilder {
            name: name.into(),
            worker,
            branches: IndexSet::new(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn worker(&self) -> &Worker {
        &self.worker
    }

    /// Branch glob patterns, in declaration order.
    pub fn branches(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(String::as_str)
    }

    pub fn has_branch_filters(&self) -> bool {
        !self.branches.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether this stage starts for `branch`.
    ///
    /// No filters means the stage always runs. Patterns use shell-style
    /// globbing where `*` also matches `/`; an unparsable pattern matches
    /// nothing.
    pub fn runs_on(&self, branch: &str) -> bool {
        if self.branches.is_empty() {
            return true;
        }
        self.branches.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(branch))
                .unwrap_or(false)
        })
    }
}

/// Builder for [`Stage`]. Validation happens in [`StageBuilder::build`].
#[derive(Debug, Clone)]
pub struct StageBuilder {
    name: String,
    worker: Worker,
    branches: IndexSet<String>,
    steps: Vec<Step>,
}

impl StageBuilder {
    /// Add a branch filter. Patterns are opaque; duplicates collapse.
    pub fn branch(mut self, pattern: impl Into<String>) -> Self {
        self.branches.insert(pattern.into());
        self
    }

    pub fn branches<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn build(self) -> Result<Stage> {
        if self.name.trim().is_empty() {
            return Err(Error::MissingField("stage name".to_string()));
        }
        Ok(Stage {
            name: self.name,
            worker: self.worker,
            branches: self.branches,
            steps: self.steps,
        })
    }
}

/// Where a stage executes.
#[derive(Debug, Clone, PartialEq)]
pub enum Worker {
    /// On the CI engine's own host.
    Local,
    /// In a Kubernetes pod built from a manifest.
    Pod(PodWorker),
    /// On a freshly provisioned virtual machine.
    RemoteVm(RemoteVmWorker),
}

impl Worker {
    pub fn pod(manifest_path: impl Into<PathBuf>, images: Vec<PodImage>) -> Result<Self> {
        let manifest_path = required_path(manifest_path.into(), "pod worker manifest path")?;
        Ok(Worker::Pod(PodWorker {
            manifest_path,
            images,
        }))
    }

    pub fn remote_vm(
        manifest_path: impl Into<PathBuf>,
        flavor: Flavor,
        image: VmImage,
    ) -> Result<Self> {
        let manifest_path = required_path(manifest_path.into(), "remote VM worker path")?;
        Ok(Worker::RemoteVm(RemoteVmWorker {
            manifest_path,
            flavor,
            image,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodWorker {
    manifest_path: PathBuf,
    images: Vec<PodImage>,
}

impl PodWorker {
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn images(&self) -> &[PodImage] {
        &self.images
    }
}

/// An image the CI engine builds before starting a pod worker.
#[derive(Debug, Clone, PartialEq)]
pub struct PodImage {
    name: String,
    build_context_path: PathBuf,
    dockerfile_path: Option<PathBuf>,
}

impl PodImage {
    pub fn new(name: impl Into<String>, build_context_path: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::MissingField("pod image name".to_string()));
        }
        let build_context_path = required_path(
            build_context_path.into(),
            &format!("build context for image '{}'", name),
        )?;
        Ok(Self {
            name,
            build_context_path,
            dockerfile_path: None,
        })
    }

    pub fn with_dockerfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.dockerfile_path = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_context_path(&self) -> &Path {
        &self.build_context_path
    }

    pub fn dockerfile_path(&self) -> Option<&Path> {
        self.dockerfile_path.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteVmWorker {
    manifest_path: PathBuf,
    flavor: Flavor,
    image: VmImage,
}

impl RemoteVmWorker {
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn image(&self) -> VmImage {
        self.image
    }
}

/// Size of a remote VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Small,
    Medium,
    Large,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Small => "small",
            Flavor::Medium => "medium",
            Flavor::Large => "large",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Flavor::Small),
            "medium" => Ok(Flavor::Medium),
            "large" => Ok(Flavor::Large),
            _ => Err(Error::invalid("flavor", format!("unknown flavor '{}'", s))),
        }
    }
}

/// Base OS images available to remote VM workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VmImage {
    Centos7,
    Rocky8,
    Ubuntu2204,
}

impl VmImage {
    pub fn as_str(&self) -> &'static str {
        match self {
            VmImage::Centos7 => "centos7",
            VmImage::Rocky8 => "rocky8",
            VmImage::Ubuntu2204 => "ubuntu-22.04",
        }
    }
}

impl fmt::Display for VmImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VmImage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "centos7" => Ok(VmImage::Centos7),
            "rocky8" => Ok(VmImage::Rocky8),
            "ubuntu-22.04" => Ok(VmImage::Ubuntu2204),
            _ => Err(Error::invalid("image", format!("unknown VM image '{}'", s))),
        }
    }
}

/// An action performed by a stage, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Start nested stages and wait for all of them to finish.
    TriggerStages(TriggerStages),
    /// Run a command on the worker and store its stdout as a property.
    SetPropertyFromCommand(SetPropertyFromCommand),
}

impl Step {
    pub fn trigger(description: impl Into<String>, stages: Vec<Stage>) -> Self {
        Step::TriggerStages(TriggerStages {
            description: description.into(),
            stages,
        })
    }

    pub fn set_property(
        description: impl Into<String>,
        property_name: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<Self> {
        let property_name = property_name.into();
        if property_name.trim().is_empty() {
            return Err(Error::MissingField("property name".to_string()));
        }
        let command = command.into();
        if command.trim().is_empty() {
            return Err(Error::MissingField(format!(
                "command for property '{}'",
                property_name
            )));
        }
        Ok(Step::SetPropertyFromCommand(SetPropertyFromCommand {
            description: description.into(),
            property_name,
            command,
        }))
    }

    pub fn description(&self) -> &str {
        match self {
            Step::TriggerStages(t) => &t.description,
            Step::SetPropertyFromCommand(s) => &s.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerStages {
    description: String,
    stages: Vec<Stage>,
}

impl TriggerStages {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetPropertyFromCommand {
    description: String,
    property_name: String,
    command: String,
}

impl SetPropertyFromCommand {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

fn required_path(path: PathBuf, field: &str) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::MissingField(field.to_string()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(name: &str) -> Stage {
        Stage::builder(name, Worker::Local).build().unwrap()
    }

    #[test]
    fn test_duplicate_stage_names_rejected() {
        let result = Project::new(vec![local("build"), local("build")]);
        assert!(matches!(result, Err(Error::Duplicate(_))));
    }

    #[test]
    fn test_duplicate_nested_stage_name_rejected() {
        let parent = Stage::builder("pre-merge", Worker::Local)
            .step(Step::trigger("nested", vec![local("lint")]))
            .build()
            .unwrap();
        let result = Project::new(vec![parent, local("lint")]);
        assert!(matches!(result, Err(Error::Duplicate(msg)) if msg.contains("lint")));
    }

    #[test]
    fn test_with_stage_checks_duplicates() {
        let project = Project::new(vec![local("a")]).unwrap();
        let project = project.with_stage(local("b")).unwrap();
        assert_eq!(project.stages().len(), 2);
        assert!(project.with_stage(local("a")).is_err());
    }

    #[test]
    fn test_empty_stage_name_rejected() {
        let result = Stage::builder("  ", Worker::Local).build();
        assert!(matches!(result, Err(Error::MissingField(_))));
    }

    #[test]
    fn test_pod_image_requires_name_and_context() {
        assert!(matches!(
            PodImage::new("", "ctx"),
            Err(Error::MissingField(_))
        ));
        assert!(matches!(
            PodImage::new("builder", ""),
            Err(Error::MissingField(_))
        ));
        let image = PodImage::new("builder", ".")
            .unwrap()
            .with_dockerfile("docs/Dockerfile");
        assert_eq!(image.dockerfile_path(), Some(Path::new("docs/Dockerfile")));
    }

    #[test]
    fn test_set_property_requires_name() {
        assert!(Step::set_property("desc", "", "echo 1").is_err());
        assert!(Step::set_property("desc", "version", "").is_err());
        let step = Step::set_property("desc", "version", "echo 1").unwrap();
        assert_eq!(step.description(), "desc");
    }

    #[test]
    fn test_walk_is_depth_first() {
        let inner = Stage::builder("inner", Worker::Local)
            .step(Step::trigger("deeper", vec![local("deepest")]))
            .build()
            .unwrap();
        let root = Stage::builder("root", Worker::Local)
            .step(Step::trigger("t", vec![inner, local("sibling")]))
            .build()
            .unwrap();
        let project = Project::new(vec![root, local("last")]).unwrap();
        let names: Vec<&str> = project.walk().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["root", "inner", "deepest", "sibling", "last"]);
        assert!(project.stage("deepest").is_some());
        assert!(project.stage("missing").is_none());
    }

    #[test]
    fn test_branch_filters() {
        let stage = Stage::builder("pre-merge", Worker::Local)
            .branches(["user/*", "feature/*", "user/*"])
            .build()
            .unwrap();
        assert_eq!(stage.branches().count(), 2);
        assert!(stage.runs_on("user/alice/fix"));
        assert!(stage.runs_on("feature/x"));
        assert!(!stage.runs_on("development/2.0"));

        assert!(local("always").runs_on("anything"));
    }

    #[test]
    fn test_invalid_glob_never_matches() {
        let stage = Stage::builder("odd", Worker::Local)
            .branch("[")
            .build()
            .unwrap();
        assert!(!stage.runs_on("["));
    }

    #[test]
    fn test_stages_for_branch() {
        let gated = Stage::builder("gated", Worker::Local)
            .branch("release/*")
            .build()
            .unwrap();
        let project = Project::new(vec![gated, local("open")]).unwrap();
        let names: Vec<&str> = project
            .stages_for_branch("feature/x")
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["open"]);
    }

    #[test]
    fn test_worker_enums_parse() {
        assert_eq!("LARGE".parse::<Flavor>().unwrap(), Flavor::Large);
        assert_eq!("centos7".parse::<VmImage>().unwrap(), VmImage::Centos7);
        assert!("xl".parse::<Flavor>().is_err());
        assert!(Worker::remote_vm("", Flavor::Small, VmImage::Rocky8).is_err());
    }
}
