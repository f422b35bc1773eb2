use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::EditError;

/// Prefix of the message recorded when a batch is aborted by an I/O failure
pub const FATAL_PREFIX: &str = "File operation failed";

/// What happened to one edit of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    /// 0-based position in the batch
    pub index: usize,

    pub applied: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditOutcome {
    pub fn new(index: usize, outcome: Result<(), String>) -> Self {
        match outcome {
            Ok(()) => Self {
                index,
                applied: true,
                error: None,
            },
            Err(error) => Self {
                index,
                applied: false,
                error: Some(error),
            },
        }
    }
}

/// Aggregate result of one batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiEditResult {
    /// At least one edit applied and the batch was not aborted
    pub success: bool,

    pub file_path: PathBuf,

    pub edits_applied: usize,

    pub total_edits: usize,

    /// `Edit {n}: ...` per failed edit, then at most one `File operation failed: ...`
    pub errors: Vec<String>,

    /// Final content of a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    pub outcomes: Vec<EditOutcome>,

    /// Set when an I/O failure stopped the batch
    pub aborted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,

    /// Line diff between the original file and `preview`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl MultiEditResult {
    pub fn new(file_path: &Path, total_edits: usize) -> Self {
        Self {
            success: false,
            file_path: file_path.to_path_buf(),
            edits_applied: 0,
            total_edits,
            errors: Vec::new(),
            preview: None,
            outcomes: Vec::with_capacity(total_edits),
            aborted: false,
            backup_path: None,
            diff: None,
        }
    }

    pub fn record(&mut self, outcome: EditOutcome) {
        if outcome.applied {
            self.edits_applied += 1;
        } else if let Some(error) = &outcome.error {
            self.errors.push(format!("Edit {}: {}", outcome.index + 1, error));
        }
        self.outcomes.push(outcome);
        self.success = !self.aborted && self.edits_applied > 0;
    }

    pub fn abort(&mut self, error: &EditError) {
        self.errors.push(format!("{}: {}", FATAL_PREFIX, error));
        self.aborted = true;
        self.success = false;
    }

    pub fn failed_edits(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.applied).count()
    }

    pub fn is_dry_run(&self) -> bool {
        self.preview.is_some()
    }

    /// Format result for display
    pub fn format_summary(&self) -> String {
        let mut output = String::new();

        output.push_str("========================================\n");
        output.push_str(if self.is_dry_run() {
            "          DRY-RUN EDIT RESULT\n"
        } else {
            "              EDIT RESULT\n"
        });
        output.push_str("========================================\n\n");

        output.push_str(&format!("📝 {}\n\n", self.file_path.display()));

        if self.aborted {
            output.push_str("❌ Batch aborted\n\n");
        } else if self.success {
            output.push_str("✅ Batch applied\n\n");
        } else {
            output.push_str("⚠️  No edits applied\n\n");
        }

        output.push_str(&format!(
            "📊 {} of {} edit{} applied\n",
            self.edits_applied,
            self.total_edits,
            if self.total_edits == 1 { "" } else { "s" }
        ));

        let failed = self.failed_edits();
        if failed > 0 {
            output.push_str(&format!("❌ {} failed\n", failed));
        }

        if let Some(backup) = &self.backup_path {
            output.push_str(&format!("💾 Backup: {}\n", backup.display()));
        }

        if !self.errors.is_empty() {
            output.push_str("\n⚠️  Errors:\n");
            for error in &self.errors {
                output.push_str(&format!("   {}\n", error));
            }
        }

        output.push_str("\n========================================\n");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_and_numbers_errors() {
        let mut result = MultiEditResult::new(Path::new("a.txt"), 3);
        result.record(EditOutcome::new(0, Ok(())));
        result.record(EditOutcome::new(1, Err("search string not found".to_string())));
        result.record(EditOutcome::new(2, Ok(())));

        assert!(result.success);
        assert_eq!(result.edits_applied, 2);
        assert_eq!(result.failed_edits(), 1);
        assert_eq!(result.errors, vec!["Edit 2: search string not found"]);
    }

    #[test]
    fn test_abort_forces_failure() {
        let mut result = MultiEditResult::new(Path::new("a.txt"), 1);
        result.record(EditOutcome::new(0, Ok(())));
        result.abort(&EditError::Write {
            path: PathBuf::from("a.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });

        assert!(!result.success);
        assert!(result.aborted);
        assert_eq!(result.edits_applied, 1);
        assert!(result.errors[0].starts_with(FATAL_PREFIX));
    }

    #[test]
    fn test_format_summary() {
        let mut result = MultiEditResult::new(Path::new("src/app.ts"), 2);
        result.record(EditOutcome::new(0, Ok(())));
        result.record(EditOutcome::new(1, Err("pattern not matched".to_string())));

        let summary = result.format_summary();
        assert!(summary.contains("src/app.ts"));
        assert!(summary.contains("1 of 2 edits applied"));
        assert!(summary.contains("Edit 2: pattern not matched"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = MultiEditResult::new(Path::new("a.txt"), 0);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["editsApplied"], 0);
        assert_eq!(json["filePath"], "a.txt");
        assert!(json.get("preview").is_none());
    }
}
