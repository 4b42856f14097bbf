//! Reference graph manifest produced by a language-analysis collaborator.
//!
//! The collaborator (a compiler plugin, a language server client, a tree
//! walker...) knows the language; deadsnip does not. It writes a JSON
//! manifest listing every file, the declarations in each file with their
//! byte spans, and every reference it found. [`Manifest::build_project`]
//! turns that into a validated [`Project`].
//!
//! A usage names the file its reference text lives in plus a byte offset.
//! The containing declaration is the one whose span covers that offset; a
//! reference outside every declaration becomes an orphaned usage of the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeadsnipError, DeadsnipResult, IoResultExt};
use crate::graph::{
    DeclarationAttrs, DeclarationId, FileAttrs, FileId, NodeRef, Project, Span, UsageAttrs,
    UsageKind,
};
use crate::logging::RunLog;
use crate::progress::{Checkpoint, Phase, Progress};

fn default_true() -> bool {
    true
}

/// Top-level manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub files: Vec<ManifestFile>,
    #[serde(default)]
    pub usages: Vec<ManifestUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub filename: String,
    #[serde(default)]
    pub entrypoint: bool,
    /// False when the collaborator skipped this file; its declarations are
    /// then never pruned.
    #[serde(default = "default_true")]
    pub reference_search: bool,
    #[serde(default)]
    pub declarations: Vec<ManifestDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDeclaration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub export: bool,
    pub span: Span,
    /// Defaults to whether the declaration is named. Nothing can refer to a
    /// bare statement, so it is only pruned when its file is.
    #[serde(default)]
    pub reference_search: Option<bool>,
}

impl ManifestDeclaration {
    pub fn searched(&self) -> bool {
        self.reference_search.unwrap_or(self.name.is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestUsage {
    pub kind: UsageKind,
    /// File containing the reference text.
    pub file: String,
    /// Byte offset of the reference in `file`.
    #[serde(default)]
    pub location: usize,
    /// Explicit index of the containing declaration in `file`, overriding
    /// attribution by location.
    #[serde(default)]
    pub containing: Option<usize>,
    pub target: ManifestTarget,
}

/// A declaration addressed by file and position in that file's list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestTarget {
    pub file: String,
    pub declaration: usize,
}

/// Read and parse a manifest from disk.
pub fn load_manifest(path: &Path) -> DeadsnipResult<Manifest> {
    let content = fs::read_to_string(path).with_path(path)?;
    serde_json::from_str(&content)
        .map_err(|e| DeadsnipError::manifest(path, format!("invalid manifest JSON: {}", e)))
}

impl Manifest {
    pub fn from_json(json: &str) -> DeadsnipResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DeadsnipError::manifest("<inline>", format!("invalid manifest JSON: {}", e)))
    }

    /// Build the reference graph.
    ///
    /// `extra_entrypoint` promotes files to entrypoints on top of the
    /// manifest's own flags (configured entrypoint globs). Any dangling
    /// reference fails the whole build.
    pub fn build_project(
        &self,
        extra_entrypoint: impl Fn(&str) -> bool,
        log: &RunLog,
        checkpoint: &mut Checkpoint<'_>,
    ) -> DeadsnipResult<Project> {
        let mut project = Project::new();
        let mut progress = Progress::new(Phase::Ingest);

        for mf in &self.files {
            let is_entrypoint = mf.entrypoint || extra_entrypoint(&mf.filename);
            let file = project.create_file(FileAttrs::new(&mf.filename).entrypoint(is_entrypoint))?;
            if mf.reference_search {
                project.mark_reference_search(NodeRef::File(file));
            }
            log.file(&mf.filename, is_entrypoint);
            progress.files += 1;

            for md in &mf.declarations {
                let mut attrs = DeclarationAttrs::new(file, md.span).exported(md.export);
                attrs.name = md.name.clone();
                let decl = project.create_declaration(attrs)?;
                if mf.reference_search && md.searched() {
                    project.mark_reference_search(NodeRef::Declaration(decl));
                }
                log.declaration(&mf.filename, md.name.as_deref(), md.export, md.span.start());
                progress.declarations += 1;
                checkpoint.tick(&progress);
            }
        }

        for (index, mu) in self.usages.iter().enumerate() {
            let file = lookup_file(&project, &mu.file, index, mu.location)?;
            let target = lookup_declaration(&project, &mu.target, index)?;
            let containing = match mu.containing {
                Some(i) => Some(declaration_by_index(&project, file, i).ok_or_else(|| {
                    DeadsnipError::graph(format!(
                        "usage #{} ({}@{}) names containing declaration #{}, but the file has {}",
                        index,
                        mu.file,
                        mu.location,
                        i,
                        project.file(file).declarations().len()
                    ))
                })?),
                None => project.declaration_at(file, mu.location),
            };

            project.create_usage(
                mu.kind,
                UsageAttrs::new(file, target).within_opt(containing).at(mu.location),
            )?;

            let target_decl = project.declaration(target);
            let target_file = project.file(target_decl.file()).filename();
            match containing {
                Some(c) => log.usage(
                    &mu.file,
                    project.declaration(c).name(),
                    target_file,
                    target_decl.name(),
                ),
                None => log.orphaned_usage(&mu.file, mu.location, target_file, target_decl.name()),
            }
            progress.analyzed_usages += 1;
            checkpoint.tick(&progress);
        }

        checkpoint.flush(&progress);
        log.info(&format!(
            "Ingested {} file(s), {} declaration(s), {} usage(s)",
            project.file_count(),
            project.declaration_count(),
            project.usage_count()
        ));
        Ok(project)
    }
}

fn lookup_file(project: &Project, filename: &str, usage: usize, location: usize) -> DeadsnipResult<FileId> {
    project.file_by_name(filename).ok_or_else(|| {
        DeadsnipError::graph(format!(
            "usage #{} at {}@{} lives in a file that is not in the project",
            usage, filename, location
        ))
    })
}

fn declaration_by_index(project: &Project, file: FileId, index: usize) -> Option<DeclarationId> {
    project.file(file).declarations().get(index).copied()
}

fn lookup_declaration(project: &Project, target: &ManifestTarget, usage: usize) -> DeadsnipResult<DeclarationId> {
    let Some(file) = project.file_by_name(&target.file) else {
        return Err(DeadsnipError::graph(format!(
            "usage #{} targets {}#{}, but that file is not in the project",
            usage, target.file, target.declaration
        )));
    };
    declaration_by_index(project, file, target.declaration).ok_or_else(|| {
        DeadsnipError::graph(format!(
            "usage #{} targets declaration #{} of {}, which has only {}",
            usage,
            target.declaration,
            target.file,
            project.file(file).declarations().len()
        ))
    })
}
