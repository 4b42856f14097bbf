//! Mark phase of mark-and-sweep over the reference graph.
//!
//! Performance characteristics:
//! - O(|V| + |E|): every node is expanded at most once per flag
//! - Explicit worklist, so arbitrarily deep reference chains cannot overflow
//!   the call stack
//!
//! The visited check is the flag itself (check-and-set), which also makes
//! cycles and self references terminate. Two independent flags
//! ([`GcFlags::REACHABLE_BY_CHECKER`], [`GcFlags::REACHABLE_BY_GREP`]) let a
//! caller run the marker twice on one graph without resetting in between.

use crate::graph::{GcFlags, NodeRef, Project};
use crate::logging::RunLog;
use crate::progress::{Checkpoint, Phase, Progress};

/// Traversal options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkOptions {
    /// Also follow textual (grep) usages, including orphaned ones.
    pub follow_grep_references: bool,
}

impl MarkOptions {
    pub fn strict() -> Self {
        Self {
            follow_grep_references: false,
        }
    }

    pub fn fuzzy() -> Self {
        Self {
            follow_grep_references: true,
        }
    }

    /// The flag conventionally paired with these options.
    pub fn flag(&self) -> GcFlags {
        if self.follow_grep_references {
            GcFlags::REACHABLE_BY_GREP
        } else {
            GcFlags::REACHABLE_BY_CHECKER
        }
    }
}

/// Per-node callback for [`walk`].
///
/// Returning `false` stops the walk from expanding that node's edges.
pub trait Visitor {
    fn visit(&mut self, node: NodeRef, flags: &mut GcFlags) -> bool;
}

/// Worklist walk over the graph.
///
/// Project → entrypoint files → their declarations → checker usages (always)
/// and grep usages (if enabled) → targets → ...
///
/// Reaching a declaration also visits its file: a file that has a live
/// declaration is loaded, so its file-level (orphaned) usages are live. A
/// non-entrypoint file's visit does not root its other declarations.
pub fn walk<V: Visitor>(project: &mut Project, options: MarkOptions, visitor: &mut V) {
    let mut worklist = vec![NodeRef::Project];

    while let Some(node) = worklist.pop() {
        if !visitor.visit(node, project.flags_mut(node)) {
            continue;
        }

        match node {
            NodeRef::Project => {
                for (id, file) in project.files() {
                    if file.is_entrypoint() {
                        worklist.push(NodeRef::File(id));
                    }
                }
            }
            NodeRef::File(id) => {
                let file = project.file(id);
                if file.is_entrypoint() {
                    worklist.extend(file.declarations().iter().map(|&d| NodeRef::Declaration(d)));
                }
                worklist.extend(file.orphaned_checker_usages().iter().map(|&u| NodeRef::Usage(u)));
                if options.follow_grep_references {
                    worklist.extend(file.orphaned_grep_usages().iter().map(|&u| NodeRef::Usage(u)));
                }
            }
            NodeRef::Declaration(id) => {
                let declaration = project.declaration(id);
                worklist.push(NodeRef::File(declaration.file()));
                worklist.extend(declaration.checker_usages().iter().map(|&u| NodeRef::Usage(u)));
                if options.follow_grep_references {
                    worklist.extend(declaration.grep_usages().iter().map(|&u| NodeRef::Usage(u)));
                }
            }
            NodeRef::Usage(id) => {
                worklist.push(NodeRef::Declaration(project.usage(id).target()));
            }
        }
    }
}

/// Check-and-set visitor used by [`mark`].
struct FlagSetter<'a, 'b> {
    flag: GcFlags,
    progress: Progress,
    checkpoint: &'a mut Checkpoint<'b>,
}

impl Visitor for FlagSetter<'_, '_> {
    fn visit(&mut self, _node: NodeRef, flags: &mut GcFlags) -> bool {
        if flags.contains(self.flag) {
            return false;
        }
        flags.insert(self.flag);
        self.progress.marked_nodes += 1;
        self.checkpoint.tick(&self.progress);
        true
    }
}

/// Set `flag` on every node reachable from the entrypoint files.
pub fn mark(project: &mut Project, flag: GcFlags, options: MarkOptions) {
    mark_with(project, flag, options, &RunLog::disabled(), &mut Checkpoint::disabled());
}

/// [`mark`] with an explicit logging sink and progress checkpoint.
///
/// Returns the number of nodes newly flagged by this call.
pub fn mark_with(
    project: &mut Project,
    flag: GcFlags,
    options: MarkOptions,
    log: &RunLog,
    checkpoint: &mut Checkpoint<'_>,
) -> usize {
    log.info(&format!(
        "Marking reachable declarations (follow_grep_references={})",
        options.follow_grep_references
    ));
    let mut setter = FlagSetter {
        flag,
        progress: Progress::new(Phase::Mark),
        checkpoint,
    };
    walk(project, options, &mut setter);
    let marked = setter.progress.marked_nodes;
    setter.checkpoint.flush(&setter.progress);
    log.info(&format!("Marked {} node(s)", marked));
    marked
}

/// Clear the bits of `mask` on every node.
pub fn reset_gc_flags(project: &mut Project, mask: GcFlags) {
    let nodes: Vec<NodeRef> = project.nodes().collect();
    for node in nodes {
        project.flags_mut(node).remove(mask);
    }
}

/// Every registered node that does not carry `flag`.
pub fn sweep(project: &Project, flag: GcFlags) -> Vec<NodeRef> {
    project
        .nodes()
        .filter(|&node| !project.flags(node).contains(flag))
        .collect()
}
