use std::path::Path;
use std::sync::PoisonError;

use tracing::{debug, info, warn};

use super::applier::{Edit, EditState};
use super::descriptor::{
    EditBatch, EditOptions, EditSet, Insertion, LiteralReplace, RegexReplace, Removal,
};
use super::persist;
use super::preview::render_diff;
use super::result::{EditOutcome, MultiEditResult};

/// Run a batch against its file.
///
/// The file is read once, every edit is folded over the content in order and
/// the final state is either written back once or returned as a preview.
/// Per-edit failures are recorded and never stop the batch; I/O failures
/// abort it.
pub fn execute(batch: EditBatch) -> MultiEditResult {
    let EditBatch {
        file_path,
        edits,
        options,
    } = batch;

    match edits {
        EditSet::Literal(edits) => run(&file_path, &edits, options),
        EditSet::Regex(edits) => run(&file_path, &edits, options),
        EditSet::Insert(edits) => run(&file_path, &edits, options),
        EditSet::Remove(edits) => run(&file_path, &edits, options),
    }
}

pub fn apply_literal_edits(
    path: impl AsRef<Path>,
    edits: &[LiteralReplace],
    options: EditOptions,
) -> MultiEditResult {
    run(path.as_ref(), edits, options)
}

pub fn apply_regex_edits(
    path: impl AsRef<Path>,
    edits: &[RegexReplace],
    options: EditOptions,
) -> MultiEditResult {
    run(path.as_ref(), edits, options)
}

pub fn insert_code(
    path: impl AsRef<Path>,
    edits: &[Insertion],
    options: EditOptions,
) -> MultiEditResult {
    run(path.as_ref(), edits, options)
}

pub fn remove_sections(
    path: impl AsRef<Path>,
    edits: &[Removal],
    options: EditOptions,
) -> MultiEditResult {
    run(path.as_ref(), edits, options)
}

fn run<E: Edit>(path: &Path, edits: &[E], options: EditOptions) -> MultiEditResult {
    let lock = persist::lock_for(path);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    let mut result = MultiEditResult::new(path, edits.len());
    info!(
        "Applying {} edit{} to {} (backup: {}, dry run: {})",
        edits.len(),
        if edits.len() == 1 { "" } else { "s" },
        path.display(),
        options.backup,
        options.dry_run
    );

    let original = match persist::read(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("{}", e);
            result.abort(&e);
            return result;
        }
    };

    if options.backup && !options.dry_run {
        match persist::write_backup(path, &original) {
            Ok(backup) => result.backup_path = Some(backup),
            Err(e) => {
                warn!("{}", e);
                result.abort(&e);
                return result;
            }
        }
    }

    let state = edits
        .iter()
        .enumerate()
        .fold(E::State::parse(&original), |state, (index, edit)| {
            let step = edit.apply(state);
            match &step.outcome {
                Ok(()) => debug!("Edit {} applied: {}", index + 1, edit.label()),
                Err(reason) => debug!("Edit {} skipped ({}): {}", index + 1, edit.label(), reason),
            }
            result.record(EditOutcome::new(index, step.outcome));
            step.state
        });

    let content = state.render();

    if options.dry_run {
        result.diff = Some(render_diff(&original, &content));
        result.preview = Some(content);
    } else if let Err(e) = persist::write(path, &content) {
        warn!("{}", e);
        result.abort(&e);
    }

    info!(
        "{}: {} of {} edits applied",
        path.display(),
        result.edits_applied,
        result.total_edits
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_temp(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("test.txt");
        fs::write(&file, content).unwrap();
        (temp, file)
    }

    #[test]
    fn test_edits_see_previous_output() {
        let (_temp, file) = write_temp("A");

        let result = apply_literal_edits(
            &file,
            &[LiteralReplace::new("A", "B"), LiteralReplace::new("B", "C")],
            EditOptions::default(),
        );

        assert!(result.success);
        assert_eq!(result.edits_applied, 2);
        assert_eq!(fs::read_to_string(&file).unwrap(), "C");
    }

    #[test]
    fn test_missing_file_aborts() {
        let temp = TempDir::new().unwrap();
        let result = apply_literal_edits(
            temp.path().join("missing.txt"),
            &[LiteralReplace::new("a", "b")],
            EditOptions::default(),
        );

        assert!(result.aborted);
        assert!(!result.success);
        assert!(result.outcomes.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("File operation failed"));
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let (_temp, file) = write_temp("one\ntwo\n");

        let result = remove_sections(
            &file,
            &[Removal::ExactLine("two".to_string())],
            EditOptions::dry_run(),
        );

        assert_eq!(result.preview.as_deref(), Some("one\n"));
        assert!(result.diff.as_deref().unwrap().contains("-two"));
        assert_eq!(fs::read_to_string(&file).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_dry_run_skips_backup() {
        let (temp, file) = write_temp("x");

        let options = EditOptions {
            backup: true,
            dry_run: true,
        };
        let result = apply_literal_edits(&file, &[LiteralReplace::new("x", "y")], options);

        assert!(result.backup_path.is_none());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_backup_failure_aborts_before_any_edit() {
        let temp = TempDir::new().unwrap();
        // Fits the usual 255-byte name limit, but its `.backup.{millis}` sibling does not
        let file = temp.path().join(format!("{}.txt", "a".repeat(240)));
        fs::write(&file, "keep").unwrap();

        let result = apply_literal_edits(
            &file,
            &[LiteralReplace::new("keep", "changed")],
            EditOptions::with_backup(),
        );

        assert!(result.aborted);
        assert!(!result.success);
        assert!(result.outcomes.is_empty());
        assert!(result.backup_path.is_none());
        assert!(result.errors[0].starts_with("File operation failed: Failed to write backup"));
        assert_eq!(fs::read_to_string(&file).unwrap(), "keep");
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_execute_dispatches_by_family() {
        let (_temp, file) = write_temp("a\nb");

        let batch = EditBatch::new(
            &file,
            EditSet::Insert(vec![Insertion::AtLine {
                line: 0,
                code: "top".to_string(),
            }]),
            EditOptions::default(),
        );
        let result = execute(batch);

        assert!(result.success);
        assert_eq!(fs::read_to_string(&file).unwrap(), "top\na\nb");
    }

    #[test]
    fn test_no_match_still_writes_once() {
        let (_temp, file) = write_temp("keep");

        let result = apply_regex_edits(
            &file,
            &[RegexReplace::new("absent", "x").unwrap()],
            EditOptions::default(),
        );

        assert!(!result.success);
        assert!(!result.aborted);
        assert_eq!(result.errors, vec!["Edit 1: pattern not matched: /absent/"]);
        assert_eq!(fs::read_to_string(&file).unwrap(), "keep");
    }
}
