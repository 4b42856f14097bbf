//! Builder pattern API for deadsnip runs.
//!
//! Provides a fluent interface for configuring and running dead code
//! elimination over a reference graph manifest:
//!
//! ```rust,ignore
//! use deadsnip_core::prelude::*;
//!
//! let result = Deadsnip::new("/path/to/project")
//!     .entrypoints(["src/index.ts"])
//!     .follow_grep_references(true)
//!     .analyze()?;
//!
//! for dead in &result.dead {
//!     println!("Dead: {}", dead);
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::{DeadsnipConfig, GlobList, IgnorePatterns};
use crate::cycles::{find_dead_cycles, DeadCycle};
use crate::graph::{GcFlags, Project, Span};
use crate::logging::RunLog;
use crate::manifest::{load_manifest, Manifest};
use crate::mark::{mark_with, MarkOptions};
use crate::progress::Checkpoint;
use crate::prune::{is_prunable, plan, PruneOptions, PrunePlan};

/// Manifest file name looked up at the project root by default.
pub const DEFAULT_MANIFEST: &str = "deadsnip-graph.json";

/// Builder for configuring a dead code elimination run.
#[derive(Debug, Clone)]
pub struct Deadsnip {
    /// Project root; manifest filenames are relative to it
    root: PathBuf,

    /// Manifest path, relative to root unless absolute
    manifest: Option<PathBuf>,

    /// Extra entrypoint globs
    entrypoints: Vec<String>,

    /// Globs restricting which files may change
    sources: Vec<String>,

    /// Name/filename patterns to keep and not report
    ignored_patterns: Vec<String>,

    /// Count grep usages as references
    follow_grep_references: bool,

    /// Keep line numbers of surviving code stable
    preserve_line_numbers: bool,

    /// Dry-run mode (don't modify files)
    dry_run: bool,
}

impl Deadsnip {
    /// Create a new builder for the given project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: None,
            entrypoints: Vec::new(),
            sources: Vec::new(),
            ignored_patterns: Vec::new(),
            follow_grep_references: false,
            preserve_line_numbers: false,
            dry_run: false,
        }
    }

    /// Create a builder seeded from a loaded deadsnip.toml.
    pub fn from_config(root: impl Into<PathBuf>, cfg: &DeadsnipConfig) -> Self {
        let mut builder = Self::new(root);
        builder.manifest = cfg.manifest.as_ref().map(PathBuf::from);
        builder.entrypoints = cfg.entrypoints.clone().unwrap_or_default();
        builder.sources = cfg.sources.clone().unwrap_or_default();
        builder.ignored_patterns = cfg.ignore.clone().unwrap_or_default();
        builder.follow_grep_references = cfg.follow_grep_references.unwrap_or(false);
        builder.preserve_line_numbers = cfg.preserve_line_numbers.unwrap_or(false);
        builder
    }

    /// Use a specific manifest file.
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    /// Add globs for files to treat as entrypoints.
    pub fn entrypoints(mut self, globs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.entrypoints.extend(globs.into_iter().map(Into::into));
        self
    }

    /// Add globs for files that may be edited or deleted.
    pub fn sources(mut self, globs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sources.extend(globs.into_iter().map(Into::into));
        self
    }

    /// Add patterns for declarations to ignore.
    pub fn ignore_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Treat textual (grep) references as keeping their target alive.
    pub fn follow_grep_references(mut self, enabled: bool) -> Self {
        self.follow_grep_references = enabled;
        self
    }

    /// Replace removed code with blank lines instead of deleting lines.
    pub fn preserve_line_numbers(mut self, enabled: bool) -> Self {
        self.preserve_line_numbers = enabled;
        self
    }

    /// Enable dry-run mode (no file modifications).
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved manifest location.
    pub fn manifest_path(&self) -> PathBuf {
        let manifest = self
            .manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
        if manifest.is_absolute() {
            manifest
        } else {
            self.root.join(manifest)
        }
    }

    /// The reachability flag that decides what gets pruned.
    pub fn sweep_flag(&self) -> GcFlags {
        if self.follow_grep_references {
            GcFlags::REACHABLE_BY_GREP
        } else {
            GcFlags::REACHABLE_BY_CHECKER
        }
    }

    /// Load the manifest and run the analysis.
    pub fn analyze(&self) -> Result<AnalysisResult> {
        let path = self.manifest_path();
        let manifest = load_manifest(&path)
            .with_context(|| format!("Failed to load manifest {}", path.display()))?;
        self.analyze_manifest(&manifest, &RunLog::new(&self.root), &mut Checkpoint::disabled())
    }

    /// Run the analysis over an already loaded manifest.
    pub fn analyze_manifest(
        &self,
        manifest: &Manifest,
        log: &RunLog,
        checkpoint: &mut Checkpoint<'_>,
    ) -> Result<AnalysisResult> {
        // 1. Build the graph
        let entrypoints = GlobList::new(self.entrypoints.as_slice()).context("Invalid entrypoint glob")?;
        let mut project = manifest
            .build_project(|f| entrypoints.is_match(f), log, checkpoint)
            .context("Failed to build reference graph")?;

        // 2. Mark twice: verified references only, then with grep matches
        mark_with(
            &mut project,
            GcFlags::REACHABLE_BY_CHECKER,
            MarkOptions::strict(),
            log,
            checkpoint,
        );
        mark_with(
            &mut project,
            GcFlags::REACHABLE_BY_GREP,
            MarkOptions::fuzzy(),
            log,
            checkpoint,
        );

        // 3. Classify and plan
        let options = PruneOptions {
            flag: self.sweep_flag(),
            sources: GlobList::new(self.sources.as_slice()).context("Invalid sources glob")?,
            ignore: IgnorePatterns::new(self.ignored_patterns.iter().cloned()),
        };
        Ok(self.classify(project, &options, log))
    }

    fn classify(&self, project: Project, options: &PruneOptions, log: &RunLog) -> AnalysisResult {
        let mut dead = Vec::new();
        for (_, decl) in project.declarations() {
            if !is_prunable(&project, decl, options) {
                continue;
            }
            let kind = if decl.flags().contains(GcFlags::REACHABLE_BY_GREP) {
                DeadItemKind::GrepOnly
            } else {
                DeadItemKind::Unreferenced
            };
            dead.push(DeadItem {
                name: decl.name().map(String::from),
                file: project.file(decl.file()).filename().to_string(),
                span: decl.span(),
                is_export: decl.is_export(),
                kind,
            });
        }

        let cycles = find_dead_cycles(
            &project,
            |d| is_prunable(&project, project.declaration(d), options),
            self.follow_grep_references,
        );
        let plan = plan(&project, options);
        log.info(&format!(
            "{} dead declaration(s), {} dead cycle(s), {} file(s) to change",
            dead.len(),
            cycles.len(),
            plan.files.len()
        ));

        AnalysisResult {
            root: self.root.clone(),
            total_declarations: project.declaration_count(),
            dead,
            cycles,
            plan,
            project,
        }
    }

    /// Apply the planned edits and deletions.
    #[cfg(feature = "fix")]
    pub fn fix(&self, result: &AnalysisResult, log: &RunLog) -> crate::fix::FixResult {
        crate::fix::fix_project(
            &self.root,
            &result.plan,
            self.preserve_line_numbers,
            self.dry_run,
            log,
        )
    }
}

/// Result of running the analysis.
#[derive(Debug)]
pub struct AnalysisResult {
    /// Root path that was analyzed
    pub root: PathBuf,

    /// Total number of declarations in the graph
    pub total_declarations: usize,

    /// Dead declarations, in project order
    pub dead: Vec<DeadItem>,

    /// Cycles among dead declarations
    pub cycles: Vec<DeadCycle>,

    /// Planned file changes
    pub plan: PrunePlan,

    /// The marked graph (for visualization)
    pub project: Project,
}

impl AnalysisResult {
    /// Check if any dead code was found.
    pub fn has_dead_code(&self) -> bool {
        !self.dead.is_empty()
    }

    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }

    /// Get percentage of dead declarations.
    pub fn dead_percentage(&self) -> f64 {
        if self.total_declarations == 0 {
            0.0
        } else {
            (self.dead.len() as f64 / self.total_declarations as f64) * 100.0
        }
    }

    /// Files that would be deleted outright.
    pub fn dead_files(&self) -> Vec<&str> {
        self.plan.deletions().map(|f| f.filename.as_str()).collect()
    }
}

/// A dead declaration with location information.
#[derive(Debug, Clone, Serialize)]
pub struct DeadItem {
    /// `None` for bare statements
    pub name: Option<String>,
    /// File containing the dead item
    pub file: String,
    pub span: Span,
    pub is_export: bool,
    pub kind: DeadItemKind,
}

impl fmt::Display for DeadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} {}{} ({})",
            self.file,
            self.span,
            if self.is_export { "export " } else { "" },
            self.name.as_deref().unwrap_or("<statement>"),
            self.kind
        )
    }
}

/// Why a declaration counts as dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadItemKind {
    /// Unreachable even when textual references count.
    Unreferenced,
    /// Unreachable by verified references, but its name appears in live code.
    GrepOnly,
}

impl fmt::Display for DeadItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreferenced => write!(f, "unreferenced"),
            Self::GrepOnly => write!(f, "grep only"),
        }
    }
}
