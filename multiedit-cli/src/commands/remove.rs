use anyhow::Result;
use std::path::PathBuf;

use multiedit::core::output::OutputWriter;
use multiedit::edit::{EditBatch, EditDescriptor, Removal};
use multiedit::EditOptions;

/// Removal predicates in the order they are applied
pub struct RemoveArgs {
    pub contains: Vec<String>,
    pub starts_with: Vec<String>,
    pub ends_with: Vec<String>,
    pub exact: Vec<String>,
    pub lines: Vec<usize>,
}

impl RemoveArgs {
    fn into_descriptors(self) -> Vec<EditDescriptor> {
        self.contains
            .into_iter()
            .map(Removal::Contains)
            .chain(self.starts_with.into_iter().map(Removal::Prefix))
            .chain(self.ends_with.into_iter().map(Removal::Suffix))
            .chain(self.exact.into_iter().map(Removal::ExactLine))
            .chain(self.lines.into_iter().map(Removal::LineNumber))
            .map(EditDescriptor::from)
            .collect()
    }
}

pub fn run(
    file: PathBuf,
    args: RemoveArgs,
    options: EditOptions,
    output: &OutputWriter,
) -> Result<bool> {
    let descriptors = args.into_descriptors();
    if descriptors.is_empty() {
        anyhow::bail!(
            "Nothing to remove: pass --contains, --starts-with, --ends-with, --exact or --line"
        );
    }

    let batch = EditBatch::from_descriptors(file, descriptors, options)?;
    let result = multiedit::execute(batch);
    super::report(&result, output)
}
