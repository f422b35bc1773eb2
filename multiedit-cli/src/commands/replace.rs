use anyhow::Result;
use std::path::PathBuf;

use multiedit::core::output::OutputWriter;
use multiedit::edit::LiteralReplace;
use multiedit::EditOptions;

pub fn run(
    file: PathBuf,
    searches: Vec<String>,
    replacements: Vec<String>,
    options: EditOptions,
    output: &OutputWriter,
) -> Result<bool> {
    if searches.len() != replacements.len() {
        anyhow::bail!(
            "Got {} --search value(s) but {} --replace value(s)",
            searches.len(),
            replacements.len()
        );
    }

    let edits: Vec<LiteralReplace> = searches
        .into_iter()
        .zip(replacements)
        .map(|(search, replace)| LiteralReplace::new(search, replace))
        .collect();

    let result = multiedit::apply_literal_edits(&file, &edits, options);
    super::report(&result, output)
}
