use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use multiedit::core::output::OutputWriter;
use multiedit::{EditOptions, EditRequest};

pub fn run(request: PathBuf, options: EditOptions, output: &OutputWriter) -> Result<bool> {
    let json = if request == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        fs::read_to_string(&request)
            .with_context(|| format!("Failed to read request: {}", request.display()))?
    };

    let mut batch = EditRequest::from_json(&json)
        .with_context(|| format!("Invalid edit request: {}", request.display()))?;

    // Command-line switches can only turn options on
    batch.options.backup |= options.backup;
    batch.options.dry_run |= options.dry_run;

    let result = multiedit::execute(batch);
    super::report(&result, output)
}
