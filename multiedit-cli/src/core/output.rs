use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::assemble::AssembleResult;
use crate::edit::MultiEditResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
    show_diff: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, show_diff: bool) -> Self {
        Self { format, show_diff }
    }

    pub fn write_edit_result(&self, result: &MultiEditResult) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            OutputFormat::Text => {
                print!("{}", result.format_summary());

                if let (Some(diff), Some(preview)) = (&result.diff, &result.preview) {
                    if self.show_diff {
                        let (added, removed) = diff_stats(diff);
                        println!("\n🔍 Preview (+{} -{})\n", added, removed);
                        print!("{}", diff);
                    } else {
                        println!("\n🔍 Preview\n");
                        println!("{}", preview);
                    }
                    println!("\n💡 Run without --dry-run to apply changes");
                }
            }
        }
        Ok(())
    }

    pub fn write_assemble_result(&self, result: &AssembleResult) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            OutputFormat::Text => match &result.error {
                None => println!("✓ Assembled {}", result.file_path.display()),
                Some(error) => eprintln!("❌ {}: {}", result.file_path.display(), error),
            },
        }
        Ok(())
    }

    pub fn write_error(&self, error: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct ErrorResponse {
                    success: bool,
                    error: String,
                }
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ErrorResponse {
                        success: false,
                        error: error.to_string()
                    })?
                );
            }
            OutputFormat::Text => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Added and removed line counts of a rendered diff
fn diff_stats(diff: &str) -> (usize, usize) {
    diff.lines().fold((0, 0), |(added, removed), line| {
        if line.starts_with('+') {
            (added + 1, removed)
        } else if line.starts_with('-') {
            (added, removed + 1)
        } else {
            (added, removed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_stats() {
        assert_eq!(diff_stats(" a\n-b\n+c\n+d\n"), (2, 1));
        assert_eq!(diff_stats(""), (0, 0));
    }
}
