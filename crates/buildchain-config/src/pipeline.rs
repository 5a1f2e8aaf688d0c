//! Build plan parsing.
//!
//! A plan is a list of `stage` nodes:
//!
//! ```kdl
//! stage "pre-merge" {
//!     worker "local"
//!     branches "user/*" "feature/*"
//!     trigger "Trigger build stages" {
//!         stage "build" {
//!             worker "pod" path="eve/workers/pod-builder/pod.yaml" {
//!                 image "docker-builder" context="eve/workers/pod-builder"
//!             }
//!         }
//!     }
//!     set-property "Set version" property="version" command="cat VERSION"
//! }
//! ```

use std::path::Path;

use crate::{ConfigError, ConfigResult};
use buildchain_core::pipeline::{PodImage, Project, Stage, Step, Worker};
use kdl::{KdlDocument, KdlNode};
use tracing::debug;

/// Read and parse a build plan file.
pub fn load_project(path: &Path) -> ConfigResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let project = parse_project(&content)?;
    debug!(path = %path.display(), stages = project.walk().len(), "Loaded build plan");
    Ok(project)
}

/// Parse a build plan from KDL text.
pub fn parse_project(kdl: &str) -> ConfigResult<Project> {
    let doc: KdlDocument = kdl.parse()?;

    let mut stages = Vec::new();
    for node in doc.nodes() {
        match node.name().value() {
            "stage" => stages.push(parse_stage(node)?),
            other => {
                return Err(ConfigError::invalid(
                    "build plan",
                    format!("unknown top-level node '{}'", other),
                ));
            }
        }
    }

    if stages.is_empty() {
        return Err(ConfigError::MissingField("stage".to_string()));
    }

    Ok(Project::new(stages)?)
}

fn parse_stage(node: &KdlNode) -> ConfigResult<Stage> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("stage name".to_string()))?;

    let mut worker = None;
    let mut branches = Vec::new();
    let mut steps = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "worker" => {
                    if worker.is_some() {
                        return Err(buildchain_core::Error::Duplicate(format!(
                            "worker for stage '{}'",
                            name
                        ))
                        .into());
                    }
                    worker = Some(parse_worker(child, &name)?);
                }
                "branches" => branches.extend(get_all_string_args(child)),
                "trigger" => steps.push(parse_trigger(child)?),
                "set-property" => steps.push(parse_set_property(child)?),
                // Silently skipping a step would change execution order.
                other => {
                    return Err(ConfigError::invalid(
                        format!("stage '{}'", name),
                        format!("unknown node '{}'", other),
                    ));
                }
            }
        }
    }

    let worker =
        worker.ok_or_else(|| ConfigError::MissingField(format!("worker for stage '{}'", name)))?;

    Ok(Stage::builder(name, worker)
        .branches(branches)
        .steps(steps)
        .build()?)
}

fn parse_worker(node: &KdlNode, stage: &str) -> ConfigResult<Worker> {
    let kind = get_first_string_arg(node).unwrap_or_default();

    match kind.as_str() {
        "local" => Ok(Worker::Local),
        "pod" => {
            let path = get_string_prop(node, "path").ok_or_else(|| {
                ConfigError::MissingField(format!("pod manifest path for stage '{}'", stage))
            })?;
            let mut images = Vec::new();
            if let Some(children) = node.children() {
                for child in children.nodes() {
                    if child.name().value() != "image" {
                        return Err(ConfigError::invalid(
                            format!("pod worker of stage '{}'", stage),
                            format!("unknown node '{}'", child.name().value()),
                        ));
                    }
                    images.push(parse_image(child)?);
                }
            }
            Ok(Worker::pod(path, images)?)
        }
        "remote-vm" => {
            let path = get_string_prop(node, "path").ok_or_else(|| {
                ConfigError::MissingField(format!("remote VM path for stage '{}'", stage))
            })?;
            let flavor = get_string_prop(node, "flavor").ok_or_else(|| {
                ConfigError::MissingField(format!("remote VM flavor for stage '{}'", stage))
            })?;
            let image = get_string_prop(node, "image").ok_or_else(|| {
                ConfigError::MissingField(format!("remote VM image for stage '{}'", stage))
            })?;
            Ok(Worker::remote_vm(path, flavor.parse()?, image.parse()?)?)
        }
        _ => Err(ConfigError::invalid(
            "worker type",
            format!("unknown worker type '{}' for stage '{}'", kind, stage),
        )),
    }
}

fn parse_image(node: &KdlNode) -> ConfigResult<PodImage> {
    let name = get_first_string_arg(node).unwrap_or_default();
    let context = get_string_prop(node, "context").unwrap_or_default();
    let image = PodImage::new(name, context)?;
    Ok(match get_string_prop(node, "dockerfile") {
        Some(dockerfile) => image.with_dockerfile(dockerfile),
        None => image,
    })
}

fn parse_trigger(node: &KdlNode) -> ConfigResult<Step> {
    let description = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("trigger description".to_string()))?;

    let mut stages = Vec::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() != "stage" {
                return Err(ConfigError::invalid(
                    format!("trigger '{}'", description),
                    format!("expected stage, found '{}'", child.name().value()),
                ));
            }
            stages.push(parse_stage(child)?);
        }
    }

    Ok(Step::trigger(description, stages))
}

fn parse_set_property(node: &KdlNode) -> ConfigResult<Step> {
    let description = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("set-property description".to_string()))?;
    let property = get_string_prop(node, "property").unwrap_or_default();
    let command = get_string_prop(node, "command").unwrap_or_default();
    Ok(Step::set_property(description, property, command)?)
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}
