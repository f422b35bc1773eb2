use anyhow::Result;
use multiedit::core::output::OutputWriter;
use multiedit::MultiEditResult;

pub mod apply;
pub mod assemble;
pub mod insert;
pub mod regex;
pub mod remove;
pub mod replace;

/// Print a batch result; a batch counts as failed only when it was aborted
fn report(result: &MultiEditResult, output: &OutputWriter) -> Result<bool> {
    output.write_edit_result(result)?;
    Ok(!result.aborted)
}
