//! CLI command implementations.

pub mod plan;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};

pub fn validate(path: &Path) -> Result<()> {
    let project = buildchain_config::load_project(path)
        .with_context(|| format!("invalid build plan {}", path.display()))?;
    println!(
        "Build plan is valid ({} stages, {} top-level)",
        project.walk().len(),
        project.stages().len()
    );
    Ok(())
}
