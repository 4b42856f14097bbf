//! From marked graph to per-file text changes.
//!
//! [`plan`] partitions unreachable declarations by file and decides, per
//! file, between deleting the whole file and snipping spans out of it.
//! [`compute_edits`] reads each affected file and runs the snipping engine
//! (collapse, apply, post-process). Files are independent, so the
//! computation runs on the rayon pool; nothing is written here.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::{GlobList, IgnorePatterns};
use crate::error::{DeadsnipResult, IoResultExt};
use crate::graph::{Declaration, DeclarationId, FileId, GcFlags, Project, Span};
use crate::postprocess::{postprocess, postprocess_preserving_lines};
use crate::snipping::{apply_edits, collapse_spans, line_count};

/// Whether a node with `flags` survives a sweep for `flag`.
///
/// Nodes whose references were never searched are kept: absence of known
/// usages proves nothing about them.
pub fn is_live(flags: GcFlags, flag: GcFlags) -> bool {
    flags.contains(flag) || !flags.contains(GcFlags::DID_REFERENCE_SEARCH)
}

/// Knobs for [`plan`].
#[derive(Debug, Clone, Default)]
pub struct PruneOptions {
    /// Reachability flag to sweep against.
    pub flag: GcFlags,
    /// Files allowed to change. Empty means every file.
    pub sources: GlobList,
    /// Dead declarations matching these (by name or filename) are kept.
    pub ignore: IgnorePatterns,
}

impl PruneOptions {
    pub fn new(flag: GcFlags) -> Self {
        Self {
            flag,
            ..Default::default()
        }
    }
}

/// What happens to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Every declaration is dead and the file is not an entrypoint.
    Delete,
    /// Snip these spans (uncollapsed, in declaration order).
    Snip(Vec<Span>),
}

#[derive(Debug, Clone)]
pub struct FilePlan {
    pub file: FileId,
    pub filename: String,
    pub dead: Vec<DeclarationId>,
    pub action: FileAction,
}

/// Every file that changes, in project order.
#[derive(Debug, Clone, Default)]
pub struct PrunePlan {
    pub files: Vec<FilePlan>,
}

impl PrunePlan {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn deletions(&self) -> impl Iterator<Item = &FilePlan> {
        self.files.iter().filter(|f| f.action == FileAction::Delete)
    }

    pub fn dead_declaration_count(&self) -> usize {
        self.files.iter().map(|f| f.dead.len()).sum()
    }
}

/// True if `declaration` should be removed under `options`.
pub fn is_prunable(project: &Project, declaration: &Declaration, options: &PruneOptions) -> bool {
    if is_live(declaration.flags(), options.flag) {
        return false;
    }
    let filename = project.file(declaration.file()).filename();
    !(options.ignore.matches(filename) || declaration.name().is_some_and(|n| options.ignore.matches(n)))
}

/// Decide what to do with each file after marking.
pub fn plan(project: &Project, options: &PruneOptions) -> PrunePlan {
    let mut files = Vec::new();

    for (id, file) in project.files() {
        if !options.sources.allows(file.filename()) {
            continue;
        }
        let dead: Vec<DeclarationId> = file
            .declarations()
            .iter()
            .copied()
            .filter(|&d| is_prunable(project, project.declaration(d), options))
            .collect();
        if dead.is_empty() {
            continue;
        }

        let action = if !file.is_entrypoint() && dead.len() == file.declarations().len() {
            FileAction::Delete
        } else {
            FileAction::Snip(dead.iter().map(|&d| project.declaration(d).span()).collect())
        };
        files.push(FilePlan {
            file: id,
            filename: file.filename().to_string(),
            dead,
            action,
        });
    }

    PrunePlan { files }
}

/// New content for one file, or its removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Rewrite(String),
    Delete,
}

/// Computed, not yet written, change to one file.
#[derive(Debug, Clone)]
pub struct FileEdit {
    pub filename: String,
    pub path: PathBuf,
    pub change: FileChange,
    pub lines_before: usize,
    pub lines_after: usize,
}

impl FileEdit {
    pub fn lines_removed(&self) -> usize {
        self.lines_before.saturating_sub(self.lines_after)
    }
}

/// Snip `spans` out of `source` and repair the syntax left behind.
pub fn edit_source(source: &str, spans: &[Span], preserve_line_numbers: bool) -> DeadsnipResult<String> {
    let collapsed = collapse_spans(spans);
    let edited = apply_edits(source, &collapsed, preserve_line_numbers)?;
    Ok(if preserve_line_numbers {
        postprocess_preserving_lines(&edited)
    } else {
        postprocess(&edited)
    })
}

fn compute_edit(root: &Path, file: &FilePlan, preserve_line_numbers: bool) -> DeadsnipResult<FileEdit> {
    let path = root.join(&file.filename);
    let source = fs::read_to_string(&path).with_path(&path)?;
    let lines_before = line_count(&source);

    let (change, lines_after) = match &file.action {
        FileAction::Delete => (FileChange::Delete, 0),
        FileAction::Snip(spans) => {
            let text = edit_source(&source, spans, preserve_line_numbers)?;
            let lines = line_count(&text);
            (FileChange::Rewrite(text), lines)
        }
    };

    Ok(FileEdit {
        filename: file.filename.clone(),
        path,
        change,
        lines_before,
        lines_after,
    })
}

/// Compute every planned change in parallel.
///
/// Results come back in plan order; a failure for one file does not stop
/// the others.
pub fn compute_edits(
    root: &Path,
    plan: &PrunePlan,
    preserve_line_numbers: bool,
) -> Vec<DeadsnipResult<FileEdit>> {
    plan.files
        .par_iter()
        .map(|file| compute_edit(root, file, preserve_line_numbers))
        .collect()
}
