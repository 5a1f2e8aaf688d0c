//! Pipeline document serializer.
//!
//! Turns a [`Project`] into the document the CI engine consumes. Steps and
//! workers become tagged records with a `type` discriminator; trigger steps
//! recurse into their child stages with the same stage rule, at any depth.
//! Sequence order is execution order and is kept exactly as built. A stage
//! without branch filters omits the `branches` key, while a trigger step
//! with no children still emits `stages: []`.

use std::io::Write;
use std::path::Path;

use buildchain_core::pipeline::{PodImage, Project, Stage, Step, Worker};
use buildchain_core::{Document, Mapping, SerializationError};
use tracing::debug;

use crate::yaml;

/// Version of the pipeline document schema.
pub const DOCUMENT_VERSION: &str = "0.2";

pub fn project_document(project: &Project) -> Document {
    Document::mapping([
        ("version", Document::from(DOCUMENT_VERSION)),
        ("stages", stages_document(project.stages())),
    ])
}

/// Render the project as YAML text.
pub fn render_project(project: &Project) -> String {
    yaml::render(&project_document(project))
}

/// Write the project document to `out` in a single write.
///
/// The whole document is rendered in memory first, so a failure never
/// leaves a truncated document behind.
pub fn emit_project<W: Write>(project: &Project, mut out: W) -> Result<(), SerializationError> {
    let text = render_project(project);
    out.write_all(text.as_bytes())?;
    out.flush()?;
    debug!(
        stages = project.walk().len(),
        bytes = text.len(),
        "Emitted pipeline document"
    );
    Ok(())
}

fn stages_document(stages: &[Stage]) -> Document {
    Document::Sequence(stages.iter().map(stage_document).collect())
}

fn stage_document(stage: &Stage) -> Document {
    let mut map = Mapping::new();
    map.insert("name".into(), stage.name().into());
    map.insert("worker".into(), worker_document(stage.worker()));
    if stage.has_branch_filters() {
        map.insert(
            "branches".into(),
            Document::Sequence(stage.branches().map(Document::from).collect()),
        );
    }
    map.insert(
        "steps".into(),
        Document::Sequence(stage.steps().iter().map(step_document).collect()),
    );
    Document::Mapping(map)
}

fn worker_document(worker: &Worker) -> Document {
    match worker {
        Worker::Local => Document::mapping([("type", "local")]),
        Worker::Pod(pod) => Document::mapping([
            ("type", Document::from("pod")),
            ("manifest_path", path_document(pod.manifest_path())),
            (
                "images",
                Document::Sequence(pod.images().iter().map(image_document).collect()),
            ),
        ]),
        Worker::RemoteVm(vm) => Document::mapping([
            ("type", Document::from("remote_vm")),
            ("manifest_path", path_document(vm.manifest_path())),
            ("flavor", vm.flavor().as_str().into()),
            ("image", vm.image().as_str().into()),
        ]),
    }
}

fn image_document(image: &PodImage) -> Document {
    let mut map = Mapping::new();
    map.insert("name".into(), image.name().into());
    map.insert(
        "build_context_path".into(),
        path_document(image.build_context_path()),
    );
    if let Some(dockerfile) = image.dockerfile_path() {
        map.insert("dockerfile_path".into(), path_document(dockerfile));
    }
    Document::Mapping(map)
}

fn step_document(step: &Step) -> Document {
    match step {
        Step::TriggerStages(trigger) => Document::mapping([
            ("type", Document::from("trigger_stages")),
            ("description", trigger.description().into()),
            ("wait_for_finish", true.into()),
            ("stages", stages_document(trigger.stages())),
        ]),
        Step::SetPropertyFromCommand(set) => Document::mapping([
            ("type", "set_property_from_command"),
            ("description", set.description()),
            ("property_name", set.property_name()),
            ("command", set.command()),
        ]),
    }
}

fn path_document(path: &Path) -> Document {
    Document::String(path.display().to_string())
}
