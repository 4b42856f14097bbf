//! Writing computed edits back to disk.
//!
//! Never panics: every per-file failure is recorded in [`FixResult::errors`]
//! and the remaining files are still processed. There is no cross-file
//! transaction; a failure midway leaves earlier files changed.
//!
//! Features:
//! - Safe file deletion with dry-run support
//! - Symlinks and non-regular files are never deleted
//! - Every action goes through the run's [`RunLog`]

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeadsnipError, DeadsnipResult, IoResultExt};
use crate::logging::RunLog;
use crate::prune::{compute_edits, FileChange, FileEdit, PrunePlan};

/// Result of a fix operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixResult {
    pub files_edited: Vec<String>,
    pub files_removed: Vec<String>,
    pub lines_removed: usize,
    pub dry_run: bool,
    pub errors: Vec<String>,
}

impl FixResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Safely remove a file.
///
/// Returns `Ok(false)` when nothing was (or would be) removed: the file is
/// missing, a symlink, or not a regular file.
pub fn remove_file(path: &Path, dry_run: bool, log: &RunLog) -> DeadsnipResult<bool> {
    // Get metadata without following symlinks
    let metadata = match path.symlink_metadata() {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(DeadsnipError::io(path, e)),
    };

    if metadata.file_type().is_symlink() {
        log.warn(&format!("Refusing to delete symlink: {}", path.display()));
        return Ok(false);
    }

    if !metadata.is_file() {
        log.warn(&format!("Not a regular file: {}", path.display()));
        return Ok(false);
    }

    if dry_run {
        return Ok(true);
    }

    fs::remove_file(path).with_path(path)?;
    Ok(true)
}

/// Overwrite `path` with `content` unless dry-running.
pub fn write_file(path: &Path, content: &str, dry_run: bool) -> DeadsnipResult<()> {
    if dry_run {
        return Ok(());
    }
    fs::write(path, content).with_path(path)
}

/// Apply one computed edit, recording the outcome.
fn apply_edit(edit: &FileEdit, dry_run: bool, log: &RunLog, result: &mut FixResult) {
    match &edit.change {
        FileChange::Rewrite(text) => match write_file(&edit.path, text, dry_run) {
            Ok(()) => {
                log.file_edited(&edit.filename, edit.lines_removed());
                result.files_edited.push(edit.filename.clone());
                result.lines_removed += edit.lines_removed();
            }
            Err(e) => result.errors.push(format!("write {}: {}", edit.filename, e)),
        },
        FileChange::Delete => match remove_file(&edit.path, dry_run, log) {
            Ok(true) => {
                log.file_deleted(&edit.filename);
                result.files_removed.push(edit.filename.clone());
                result.lines_removed += edit.lines_removed();
            }
            Ok(false) => {}
            Err(e) => result.errors.push(format!("remove {}: {}", edit.filename, e)),
        },
    }
}

/// Main fix orchestration function.
///
/// Computes every edit (in parallel), then writes and deletes sequentially.
/// Continues on individual file errors and reports all of them at the end.
pub fn fix_project(root: &Path, plan: &PrunePlan, preserve_line_numbers: bool, dry_run: bool, log: &RunLog) -> FixResult {
    let mut result = FixResult {
        dry_run,
        ..Default::default()
    };

    if plan.is_empty() {
        log.info("No dead declarations to remove");
        return result;
    }

    let mode = if dry_run { "DRY-RUN" } else { "FIX" };
    log.info(&format!("[{}] Processing {} file(s)", mode, plan.files.len()));

    for outcome in compute_edits(root, plan, preserve_line_numbers) {
        match outcome {
            Ok(edit) => apply_edit(&edit, dry_run, log, &mut result),
            Err(e) => result.errors.push(e.to_string()),
        }
    }

    for err in &result.errors {
        log.warn(err);
    }
    result
}
