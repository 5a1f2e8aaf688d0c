//! Build plan commands.

use std::path::Path;

use anyhow::{Context, Result};
use buildchain_core::pipeline::Project;

fn load(path: &Path) -> Result<Project> {
    buildchain_config::load_project(path)
        .with_context(|| format!("failed to load build plan {}", path.display()))
}

/// Write the pipeline document to stdout.
pub fn emit(path: &Path) -> Result<()> {
    let project = load(path)?;
    let stdout = std::io::stdout();
    buildchain_render::emit_project(&project, stdout.lock())
        .context("failed to write pipeline document")?;
    Ok(())
}

pub fn stages(path: &Path, branch: &str) -> Result<()> {
    let project = load(path)?;
    let matching = project.stages_for_branch(branch);
    if matching.is_empty() {
        println!("No stages start for branch {}", branch);
        return Ok(());
    }
    for stage in matching {
        println!("{}", stage.name());
    }
    Ok(())
}
