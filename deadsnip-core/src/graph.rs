//! Reference graph model: projects, files, declarations and usages.
//!
//! References here point the "useful" way for garbage collection. If the body
//! of declaration A calls declaration B, then A emits a usage whose target is
//! B. A compiler's find-references answer is the reverse (B's name node is
//! referenced from an identifier inside A), so collaborators have to invert
//! it when they build the graph.
//!
//! The [`Project`] is the arena that owns every node. Nodes are created only
//! through its factory methods, which validate invariants and register the
//! node for later enumeration. Nodes are never removed; deletion is purely
//! textual (see [`crate::snipping`]). The GC flag bitfield is the only
//! attribute that changes after construction.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::error::{DeadsnipError, DeadsnipResult};

/// Index of a [`File`] inside its [`Project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

/// Index of a [`Declaration`] inside its [`Project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId(usize);

/// Index of a [`Usage`] inside its [`Project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsageId(usize);

impl FileId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl DeclarationId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl UsageId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// GC flag bitfield carried by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GcFlags(u8);

impl GcFlags {
    pub const NONE: Self = Self(0);
    /// Reachable following only compiler-verified usages.
    pub const REACHABLE_BY_CHECKER: Self = Self(1);
    /// Reachable when textual (grep) usages are followed too.
    pub const REACHABLE_BY_GREP: Self = Self(2);
    /// The collaborator searched this node's references.
    pub const DID_REFERENCE_SEARCH: Self = Self(4);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for GcFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Half-open byte range `[start, end)` plus the offset where its leading
/// trivia (whitespace, comments) begins.
///
/// `full_start <= start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct Span {
    full_start: usize,
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawSpan {
    #[serde(default)]
    full_start: Option<usize>,
    start: usize,
    end: usize,
}

impl TryFrom<RawSpan> for Span {
    type Error = DeadsnipError;

    fn try_from(raw: RawSpan) -> DeadsnipResult<Self> {
        Span::new(raw.full_start.unwrap_or(raw.start), raw.start, raw.end)
    }
}

impl Span {
    /// Create a span, rejecting `end < start` and `full_start > start`.
    pub fn new(full_start: usize, start: usize, end: usize) -> DeadsnipResult<Self> {
        if end < start {
            return Err(DeadsnipError::invalid_span(full_start, start, end, "end before start"));
        }
        if full_start > start {
            return Err(DeadsnipError::invalid_span(
                full_start,
                start,
                end,
                "full_start after start",
            ));
        }
        Ok(Self {
            full_start,
            start,
            end,
        })
    }

    /// Span without leading trivia.
    pub fn bare(start: usize, end: usize) -> DeadsnipResult<Self> {
        Self::new(start, start, end)
    }

    pub fn full_start(&self) -> usize {
        self.full_start
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` lies in `[start, end)`.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Same span with a different end. Callers keep `end >= start`.
    pub(crate) fn with_end(self, end: usize) -> Self {
        debug_assert!(end >= self.start);
        Self { end, ..self }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Provenance of a usage edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageKind {
    /// The type checker linked the two nodes. Authoritative.
    Checker,
    /// The target's name appears in the text. Might be a coincidence.
    Grep,
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checker => write!(f, "checker"),
            Self::Grep => write!(f, "grep"),
        }
    }
}

/// Any node of the graph. Closed set of kinds; traversals match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Project,
    File(FileId),
    Declaration(DeclarationId),
    Usage(UsageId),
}

/// One source unit.
#[derive(Debug, Clone)]
pub struct File {
    filename: String,
    is_entrypoint: bool,
    declarations: Vec<DeclarationId>,
    orphaned_checker_usages: Vec<UsageId>,
    orphaned_grep_usages: Vec<UsageId>,
    flags: GcFlags,
}

impl File {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn is_entrypoint(&self) -> bool {
        self.is_entrypoint
    }

    pub fn declarations(&self) -> &[DeclarationId] {
        &self.declarations
    }

    pub fn orphaned_checker_usages(&self) -> &[UsageId] {
        &self.orphaned_checker_usages
    }

    pub fn orphaned_grep_usages(&self) -> &[UsageId] {
        &self.orphaned_grep_usages
    }

    pub fn flags(&self) -> GcFlags {
        self.flags
    }
}

/// A named or anonymous top-level unit of code.
#[derive(Debug, Clone)]
pub struct Declaration {
    file: FileId,
    name: Option<String>,
    is_export: bool,
    span: Span,
    checker_usages: Vec<UsageId>,
    grep_usages: Vec<UsageId>,
    flags: GcFlags,
}

impl Declaration {
    pub fn file(&self) -> FileId {
        self.file
    }

    /// `None` for bare statements.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_export(&self) -> bool {
        self.is_export
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Verified references this declaration's body makes.
    pub fn checker_usages(&self) -> &[UsageId] {
        &self.checker_usages
    }

    /// Textual references this declaration's body makes.
    pub fn grep_usages(&self) -> &[UsageId] {
        &self.grep_usages
    }

    pub fn flags(&self) -> GcFlags {
        self.flags
    }
}

/// Directed reference edge from a declaration (or file-level code) to a
/// target declaration.
#[derive(Debug, Clone)]
pub struct Usage {
    kind: UsageKind,
    file: FileId,
    containing_declaration: Option<DeclarationId>,
    location: usize,
    target: DeclarationId,
    flags: GcFlags,
}

impl Usage {
    pub fn kind(&self) -> UsageKind {
        self.kind
    }

    /// File the reference text lives in.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// `None` means the usage is orphaned on its file.
    pub fn containing_declaration(&self) -> Option<DeclarationId> {
        self.containing_declaration
    }

    /// Byte offset of the reference, for diagnostics only.
    pub fn location(&self) -> usize {
        self.location
    }

    pub fn target(&self) -> DeclarationId {
        self.target
    }

    pub fn flags(&self) -> GcFlags {
        self.flags
    }
}

/// Attributes for [`Project::create_file`].
#[derive(Debug, Clone, Default)]
pub struct FileAttrs {
    pub filename: String,
    pub is_entrypoint: bool,
}

impl FileAttrs {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn entrypoint(mut self, is_entrypoint: bool) -> Self {
        self.is_entrypoint = is_entrypoint;
        self
    }
}

/// Attributes for [`Project::create_declaration`].
#[derive(Debug, Clone)]
pub struct DeclarationAttrs {
    pub file: FileId,
    pub name: Option<String>,
    pub is_export: bool,
    pub span: Span,
}

impl DeclarationAttrs {
    pub fn new(file: FileId, span: Span) -> Self {
        Self {
            file,
            name: None,
            is_export: false,
            span,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn exported(mut self, is_export: bool) -> Self {
        self.is_export = is_export;
        self
    }
}

/// Attributes for [`Project::create_checker_usage`] and
/// [`Project::create_grep_usage`].
#[derive(Debug, Clone)]
pub struct UsageAttrs {
    pub file: FileId,
    pub target: DeclarationId,
    pub containing_declaration: Option<DeclarationId>,
    pub location: usize,
}

impl UsageAttrs {
    /// A usage in `file` pointing at `target`, orphaned until [`Self::within`].
    pub fn new(file: FileId, target: DeclarationId) -> Self {
        Self {
            file,
            target,
            containing_declaration: None,
            location: 0,
        }
    }

    pub fn within(mut self, declaration: DeclarationId) -> Self {
        self.containing_declaration = Some(declaration);
        self
    }

    pub fn within_opt(mut self, declaration: Option<DeclarationId>) -> Self {
        self.containing_declaration = declaration;
        self
    }

    pub fn at(mut self, location: usize) -> Self {
        self.location = location;
        self
    }
}

/// Root container and arena owner for one analysis run.
#[derive(Debug, Default)]
pub struct Project {
    flags: GcFlags,
    files: Vec<File>,
    declarations: Vec<Declaration>,
    usages: Vec<Usage>,
    files_by_name: HashMap<String, FileId>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------

    /// Register a file. Filenames are unique keys.
    pub fn create_file(&mut self, attrs: FileAttrs) -> DeadsnipResult<FileId> {
        if self.files_by_name.contains_key(&attrs.filename) {
            return Err(DeadsnipError::graph(format!(
                "file registered twice: {}",
                attrs.filename
            )));
        }
        let id = FileId(self.files.len());
        self.files_by_name.insert(attrs.filename.clone(), id);
        self.files.push(File {
            filename: attrs.filename,
            is_entrypoint: attrs.is_entrypoint,
            declarations: Vec::new(),
            orphaned_checker_usages: Vec::new(),
            orphaned_grep_usages: Vec::new(),
            flags: GcFlags::NONE,
        });
        Ok(id)
    }

    /// Register a declaration and append it to its owning file.
    pub fn create_declaration(&mut self, attrs: DeclarationAttrs) -> DeadsnipResult<DeclarationId> {
        if attrs.file.0 >= self.files.len() {
            return Err(DeadsnipError::graph(format!(
                "declaration `{}` at {} belongs to unknown file #{}",
                attrs.name.as_deref().unwrap_or("<statement>"),
                attrs.span,
                attrs.file.0
            )));
        }
        let id = DeclarationId(self.declarations.len());
        self.files[attrs.file.0].declarations.push(id);
        self.declarations.push(Declaration {
            file: attrs.file,
            name: attrs.name,
            is_export: attrs.is_export,
            span: attrs.span,
            checker_usages: Vec::new(),
            grep_usages: Vec::new(),
            flags: GcFlags::NONE,
        });
        Ok(id)
    }

    /// Register a compiler-verified usage.
    pub fn create_checker_usage(&mut self, attrs: UsageAttrs) -> DeadsnipResult<UsageId> {
        self.create_usage(UsageKind::Checker, attrs)
    }

    /// Register a textual usage.
    pub fn create_grep_usage(&mut self, attrs: UsageAttrs) -> DeadsnipResult<UsageId> {
        self.create_usage(UsageKind::Grep, attrs)
    }

    /// Register a usage of either kind.
    pub fn create_usage(&mut self, kind: UsageKind, attrs: UsageAttrs) -> DeadsnipResult<UsageId> {
        let Some(file) = self.files.get(attrs.file.0) else {
            return Err(DeadsnipError::graph(format!(
                "{} usage at offset {} lives in unknown file #{}",
                kind, attrs.location, attrs.file.0
            )));
        };
        if attrs.target.0 >= self.declarations.len() {
            return Err(DeadsnipError::graph(format!(
                "{} usage in {}@{} targets unknown declaration #{}",
                kind, file.filename, attrs.location, attrs.target.0
            )));
        }
        if let Some(container) = attrs.containing_declaration {
            let Some(decl) = self.declarations.get(container.0) else {
                return Err(DeadsnipError::graph(format!(
                    "{} usage in {}@{} is contained by unknown declaration #{}",
                    kind, file.filename, attrs.location, container.0
                )));
            };
            if decl.file != attrs.file {
                return Err(DeadsnipError::graph(format!(
                    "{} usage in {}@{} is contained by {}, which lives in another file",
                    kind,
                    file.filename,
                    attrs.location,
                    self.describe(NodeRef::Declaration(container))
                )));
            }
        }

        let id = UsageId(self.usages.len());
        match (attrs.containing_declaration, kind) {
            (Some(d), UsageKind::Checker) => self.declarations[d.0].checker_usages.push(id),
            (Some(d), UsageKind::Grep) => self.declarations[d.0].grep_usages.push(id),
            (None, UsageKind::Checker) => self.files[attrs.file.0].orphaned_checker_usages.push(id),
            (None, UsageKind::Grep) => self.files[attrs.file.0].orphaned_grep_usages.push(id),
        }
        self.usages.push(Usage {
            kind,
            file: attrs.file,
            containing_declaration: attrs.containing_declaration,
            location: attrs.location,
            target: attrs.target,
            flags: GcFlags::NONE,
        });
        Ok(id)
    }

    /// Record that the collaborator searched references for `node`.
    pub fn mark_reference_search(&mut self, node: NodeRef) {
        self.flags_mut(node).insert(GcFlags::DID_REFERENCE_SEARCH);
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Node ids are minted by this project only, so indexing cannot fail
    /// for ids obtained from it.
    pub fn file(&self, id: FileId) -> &File {
        &self.files[id.0]
    }

    pub fn declaration(&self, id: DeclarationId) -> &Declaration {
        &self.declarations[id.0]
    }

    pub fn usage(&self, id: UsageId) -> &Usage {
        &self.usages[id.0]
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &File)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    pub fn declarations(&self) -> impl Iterator<Item = (DeclarationId, &Declaration)> {
        self.declarations
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclarationId(i), d))
    }

    pub fn usages(&self) -> impl Iterator<Item = (UsageId, &Usage)> {
        self.usages.iter().enumerate().map(|(i, u)| (UsageId(i), u))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn declaration_count(&self) -> usize {
        self.declarations.len()
    }

    pub fn usage_count(&self) -> usize {
        self.usages.len()
    }

    pub fn file_by_name(&self, filename: &str) -> Option<FileId> {
        self.files_by_name.get(filename).copied()
    }

    /// First declaration of `file` whose `[start, end)` contains `location`.
    ///
    /// Used to attribute a reference to the declaration whose body holds it.
    pub fn declaration_at(&self, file: FileId, location: usize) -> Option<DeclarationId> {
        self.files
            .get(file.0)?
            .declarations
            .iter()
            .copied()
            .find(|d| self.declarations[d.0].span.contains(location))
    }

    /// Every registered node: the project, then files, declarations, usages.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        std::iter::once(NodeRef::Project)
            .chain((0..self.files.len()).map(|i| NodeRef::File(FileId(i))))
            .chain((0..self.declarations.len()).map(|i| NodeRef::Declaration(DeclarationId(i))))
            .chain((0..self.usages.len()).map(|i| NodeRef::Usage(UsageId(i))))
    }

    pub fn node_count(&self) -> usize {
        1 + self.files.len() + self.declarations.len() + self.usages.len()
    }

    pub fn flags(&self, node: NodeRef) -> GcFlags {
        match node {
            NodeRef::Project => self.flags,
            NodeRef::File(id) => self.files[id.0].flags,
            NodeRef::Declaration(id) => self.declarations[id.0].flags,
            NodeRef::Usage(id) => self.usages[id.0].flags,
        }
    }

    pub(crate) fn flags_mut(&mut self, node: NodeRef) -> &mut GcFlags {
        match node {
            NodeRef::Project => &mut self.flags,
            NodeRef::File(id) => &mut self.files[id.0].flags,
            NodeRef::Declaration(id) => &mut self.declarations[id.0].flags,
            NodeRef::Usage(id) => &mut self.usages[id.0].flags,
        }
    }

    /// Human-readable node description for diagnostics.
    pub fn describe(&self, node: NodeRef) -> String {
        match node {
            NodeRef::Project => "project".to_string(),
            NodeRef::File(id) => format!("file {}", self.files[id.0].filename),
            NodeRef::Declaration(id) => {
                let d = &self.declarations[id.0];
                format!(
                    "declaration `{}` in {}@{}",
                    d.name.as_deref().unwrap_or("<statement>"),
                    self.files[d.file.0].filename,
                    d.span.start
                )
            }
            NodeRef::Usage(id) => {
                let u = &self.usages[id.0];
                format!(
                    "{} usage in {}@{} -> {}",
                    u.kind,
                    self.files[u.file.0].filename,
                    u.location,
                    self.declarations[u.target.0]
                        .name
                        .as_deref()
                        .unwrap_or("<statement>")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(full_start: usize, start: usize, end: usize) -> Span {
        Span::new(full_start, start, end).unwrap()
    }

    #[test]
    fn test_span_rejects_end_before_start() {
        let err = Span::new(0, 5, 3).unwrap_err();
        assert!(matches!(err, DeadsnipError::InvalidSpan { .. }));
    }

    #[test]
    fn test_span_rejects_full_start_after_start() {
        assert!(Span::new(4, 3, 10).is_err());
        assert!(Span::new(3, 3, 3).is_ok());
    }

    #[test]
    fn test_span_contains_is_half_open() {
        let s = span(0, 2, 5);
        assert!(!s.contains(1));
        assert!(s.contains(2));
        assert!(s.contains(4));
        assert!(!s.contains(5));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_span_deserialize_defaults_full_start() {
        let s: Span = serde_json::from_str(r#"{"start": 4, "end": 9}"#).unwrap();
        assert_eq!(s, span(4, 4, 9));
        let bad: Result<Span, _> = serde_json::from_str(r#"{"start": 9, "end": 4}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_new_nodes_have_zero_flags() {
        let mut p = Project::new();
        let f = p.create_file(FileAttrs::new("a.ts")).unwrap();
        let d = p.create_declaration(DeclarationAttrs::new(f, span(0, 0, 3))).unwrap();
        let u = p.create_checker_usage(UsageAttrs::new(f, d).within(d)).unwrap();
        for node in p.nodes() {
            assert!(p.flags(node).is_empty(), "{:?} should start clean", node);
        }
        assert_eq!(p.node_count(), 4);
        assert_eq!(p.nodes().count(), 4);
        assert_eq!(p.declaration(d).checker_usages(), &[u]);
    }

    #[test]
    fn test_duplicate_file_rejected() {
        let mut p = Project::new();
        p.create_file(FileAttrs::new("a.ts")).unwrap();
        let err = p.create_file(FileAttrs::new("a.ts")).unwrap_err();
        assert!(err.to_string().contains("a.ts"));
    }

    #[test]
    fn test_declaration_in_unknown_file_rejected() {
        let mut other = Project::new();
        other.create_file(FileAttrs::new("x.ts")).unwrap();
        let foreign = other.create_file(FileAttrs::new("y.ts")).unwrap();

        let mut p = Project::new();
        let err = p
            .create_declaration(DeclarationAttrs::new(foreign, span(0, 0, 1)).named("foo"))
            .unwrap_err();
        assert!(matches!(err, DeadsnipError::Graph { .. }));
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn test_usage_with_unknown_target_rejected() {
        let mut p = Project::new();
        let f = p.create_file(FileAttrs::new("a.ts")).unwrap();
        let err = p
            .create_checker_usage(UsageAttrs::new(f, DeclarationId(7)).at(12))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a.ts@12"), "diagnostic should name the location: {}", msg);
    }

    #[test]
    fn test_usage_contained_by_foreign_declaration_rejected() {
        let mut p = Project::new();
        let a = p.create_file(FileAttrs::new("a.ts")).unwrap();
        let b = p.create_file(FileAttrs::new("b.ts")).unwrap();
        let da = p.create_declaration(DeclarationAttrs::new(a, span(0, 0, 5))).unwrap();
        let db = p.create_declaration(DeclarationAttrs::new(b, span(0, 0, 5))).unwrap();
        assert!(p.create_grep_usage(UsageAttrs::new(b, da).within(da)).is_err());
        assert!(p.create_grep_usage(UsageAttrs::new(b, da).within(db)).is_ok());
    }

    #[test]
    fn test_orphaned_usages_attach_to_file() {
        let mut p = Project::new();
        let a = p.create_file(FileAttrs::new("a.ts")).unwrap();
        let d = p.create_declaration(DeclarationAttrs::new(a, span(0, 0, 5))).unwrap();
        let c = p.create_checker_usage(UsageAttrs::new(a, d).at(30)).unwrap();
        let g = p.create_grep_usage(UsageAttrs::new(a, d).at(40)).unwrap();

        let file = p.file(a);
        assert_eq!(file.orphaned_checker_usages(), &[c]);
        assert_eq!(file.orphaned_grep_usages(), &[g]);
        assert!(p.declaration(d).checker_usages().is_empty());
        assert_eq!(p.usage(c).containing_declaration(), None);
        assert_eq!(p.usage(g).kind(), UsageKind::Grep);
    }

    #[test]
    fn test_declaration_back_reference() {
        let mut p = Project::new();
        let a = p.create_file(FileAttrs::new("a.ts").entrypoint(true)).unwrap();
        let d = p
            .create_declaration(DeclarationAttrs::new(a, span(0, 1, 4)).named("foo").exported(true))
            .unwrap();
        assert_eq!(p.declaration(d).file(), a);
        assert_eq!(p.file(a).declarations(), &[d]);
        assert!(p.file(a).is_entrypoint());
        assert_eq!(p.declaration(d).name(), Some("foo"));
        assert!(p.declaration(d).is_export());
        assert_eq!(p.file_by_name("a.ts"), Some(a));
        assert_eq!(p.file_by_name("missing.ts"), None);
    }

    #[test]
    fn test_declaration_at_uses_start_end() {
        let mut p = Project::new();
        let a = p.create_file(FileAttrs::new("a.ts")).unwrap();
        let d1 = p.create_declaration(DeclarationAttrs::new(a, span(0, 2, 10))).unwrap();
        let d2 = p.create_declaration(DeclarationAttrs::new(a, span(10, 12, 20))).unwrap();
        assert_eq!(p.declaration_at(a, 0), None, "leading trivia is not part of the body");
        assert_eq!(p.declaration_at(a, 2), Some(d1));
        assert_eq!(p.declaration_at(a, 10), None);
        assert_eq!(p.declaration_at(a, 19), Some(d2));
        assert_eq!(p.declaration_at(a, 20), None);
    }

    #[test]
    fn test_gc_flags_ops() {
        let mut f = GcFlags::NONE;
        f.insert(GcFlags::REACHABLE_BY_CHECKER);
        assert!(f.contains(GcFlags::REACHABLE_BY_CHECKER));
        assert!(!f.contains(GcFlags::REACHABLE_BY_GREP));
        assert!(!f.contains(GcFlags::REACHABLE_BY_CHECKER | GcFlags::REACHABLE_BY_GREP));
        f.remove(GcFlags::REACHABLE_BY_CHECKER);
        assert!(f.is_empty());
    }

    #[test]
    fn test_mark_reference_search() {
        let mut p = Project::new();
        let a = p.create_file(FileAttrs::new("a.ts")).unwrap();
        p.mark_reference_search(NodeRef::File(a));
        assert!(p.file(a).flags().contains(GcFlags::DID_REFERENCE_SEARCH));
    }

    #[test]
    fn test_describe_nodes() {
        let mut p = Project::new();
        let a = p.create_file(FileAttrs::new("a.ts")).unwrap();
        let d = p.create_declaration(DeclarationAttrs::new(a, span(0, 3, 9)).named("foo")).unwrap();
        let u = p.create_grep_usage(UsageAttrs::new(a, d).at(5)).unwrap();
        assert_eq!(p.describe(NodeRef::Declaration(d)), "declaration `foo` in a.ts@3");
        assert_eq!(p.describe(NodeRef::Usage(u)), "grep usage in a.ts@5 -> foo");
        assert_eq!(p.describe(NodeRef::File(a)), "file a.ts");
    }
}
