use anyhow::Result;
use std::path::PathBuf;

use multiedit::core::output::OutputWriter;
use multiedit::edit::Insertion;
use multiedit::EditOptions;

pub fn run(
    file: PathBuf,
    after: Option<String>,
    before: Option<String>,
    at_line: Option<usize>,
    code: String,
    options: EditOptions,
    output: &OutputWriter,
) -> Result<bool> {
    // clap guarantees exactly one target
    let insertion = match (after, before, at_line) {
        (Some(anchor), _, _) => Insertion::AfterAnchor { anchor, code },
        (_, Some(anchor), _) => Insertion::BeforeAnchor { anchor, code },
        (_, _, Some(line)) => Insertion::AtLine { line, code },
        (None, None, None) => anyhow::bail!("One of --after, --before or --at-line is required"),
    };

    let result = multiedit::insert_code(&file, &[insertion], options);
    super::report(&result, output)
}
