//! Rendered target commands.

use std::path::Path;

use anyhow::{Context, Result};
use buildchain_core::{Format, Target};
use buildchain_render::SerializedData;

pub fn render(input: &Path, output: &Path, format: Format) -> Result<()> {
    let data = buildchain_config::load_document(input)
        .with_context(|| format!("failed to load payload {}", input.display()))?;
    let target = SerializedData::new(data, output, format)?.with_file_dep(input);
    target
        .execute()
        .with_context(|| target.task().title.clone())?;
    println!("{}", target.task().title);
    Ok(())
}

pub fn clean(output: &Path) -> Result<()> {
    buildchain_core::target::remove_path(output)
        .with_context(|| format!("failed to remove {}", output.display()))?;
    Ok(())
}
