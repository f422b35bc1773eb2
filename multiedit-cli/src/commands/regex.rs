use anyhow::{Context, Result};
use regex::RegexBuilder;
use std::path::PathBuf;

use multiedit::core::output::OutputWriter;
use multiedit::edit::RegexReplace;
use multiedit::EditOptions;

pub fn run(
    file: PathBuf,
    patterns: Vec<String>,
    replacements: Vec<String>,
    first_only: bool,
    ignore_case: bool,
    options: EditOptions,
    output: &OutputWriter,
) -> Result<bool> {
    if patterns.len() != replacements.len() {
        anyhow::bail!(
            "Got {} --pattern value(s) but {} --replacement value(s)",
            patterns.len(),
            replacements.len()
        );
    }

    let mut edits = Vec::with_capacity(patterns.len());
    for (pattern, replacement) in patterns.iter().zip(replacements) {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .with_context(|| format!("Invalid regex pattern: {}", pattern))?;

        edits.push(RegexReplace::from_regex(regex, replacement, !first_only));
    }

    let result = multiedit::apply_regex_edits(&file, &edits, options);
    super::report(&result, output)
}
