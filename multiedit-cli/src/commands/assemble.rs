use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use multiedit::core::output::OutputWriter;
use multiedit::Section;

pub fn run(file: PathBuf, sections_path: PathBuf, output: &OutputWriter) -> Result<bool> {
    let json = fs::read_to_string(&sections_path)
        .with_context(|| format!("Failed to read sections: {}", sections_path.display()))?;
    let sections: Vec<Section> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid sections file: {}", sections_path.display()))?;

    let result = multiedit::assemble_file(&file, &sections);
    output.write_assemble_result(&result)?;

    Ok(result.success)
}
