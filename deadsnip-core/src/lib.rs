//! deadsnip-core: mark-and-sweep dead code elimination over a reference graph
//!
//! This library is language agnostic. A collaborator that understands the
//! language extracts files, top-level declarations (with byte spans) and the
//! references between them; deadsnip decides what is unreachable from the
//! entrypoints and snips it out of the source text.
//!
//! # Features
//!
//! - **Reference graph**: arena of files, declarations and usages built
//!   through validating factory methods
//! - **Mark phase**: worklist traversal with check-and-set GC flags, strict
//!   (verified references) and fuzzy (plus textual matches)
//! - **Span snipping**: collapse overlapping deletions, remove them from the
//!   text, optionally keeping line numbers stable
//! - **Syntax repair**: fixpoint regex passes for dangling separators and
//!   empty variable statements
//! - **Pipeline**: per-file planning, parallel edit computation, whole-file
//!   deletion, error-aggregating write-out
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use deadsnip_core::prelude::*;
//!
//! let result = Deadsnip::new("/path/to/project")
//!     .manifest("deadsnip-graph.json")
//!     .analyze()?;
//!
//! for dead in &result.dead {
//!     println!("Dead: {}", dead);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`graph`]: Reference graph model and node factory
//! - [`mark`]: Reachability marking
//! - [`snipping`]: Span collapsing and text deletion
//! - [`postprocess`]: Syntax repair after deletion
//! - [`manifest`]: Collaborator interchange format
//! - [`prune`]: Planning and computing per-file changes
//! - [`builder`]: Fluent builder API for configuration
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `fix` (default): Write edits back to disk
//! - `dot` (default): Graphviz DOT output
//! - `full`: Enable all optional features

// Core modules (always available)
pub mod builder;
pub mod config;
pub mod cycles;
pub mod error;
pub mod graph;
pub mod logging;
pub mod manifest;
pub mod mark;
pub mod postprocess;
pub mod prelude;
pub mod progress;
pub mod prune;
pub mod report;
pub mod snipping;

// Feature-gated modules
#[cfg(feature = "fix")]
pub mod fix;

#[cfg(feature = "dot")]
pub mod visualize;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DeadsnipError, DeadsnipResult, IoResultExt};

// Builder API
pub use builder::{AnalysisResult, DeadItem, DeadItemKind, Deadsnip, DEFAULT_MANIFEST};

// Configuration
pub use config::{load_config, parse_config, DeadsnipConfig, GlobList, IgnorePatterns, OutputConfig, CONFIG_FILE};

// Graph model
pub use graph::{
    Declaration, DeclarationAttrs, DeclarationId, File, FileAttrs, FileId, GcFlags, NodeRef,
    Project, Span, Usage, UsageAttrs, UsageId, UsageKind,
};

// Marking
pub use mark::{mark, mark_with, reset_gc_flags, sweep, walk, MarkOptions, Visitor};

// Snipping and repair
pub use postprocess::{postprocess, postprocess_preserving_lines};
pub use snipping::{apply_edits, collapse_spans, line_count};

// Pipeline
pub use cycles::{find_dead_cycles, DeadCycle};
pub use manifest::{load_manifest, Manifest};
pub use prune::{
    compute_edits, edit_source, is_live, is_prunable, plan, FileAction, FileChange, FileEdit,
    FilePlan, PruneOptions, PrunePlan,
};

// Logging and progress
pub use logging::{init_structured_logging, loggable_filename, RunLog};
pub use progress::{Checkpoint, Phase, Progress};

// Reporting
pub use report::{print_json, print_plain, render_plain, to_json};

// Feature-gated re-exports
#[cfg(feature = "fix")]
pub use fix::{fix_project, remove_file, write_file, FixResult};

#[cfg(feature = "fix")]
pub use report::print_fix_summary;

#[cfg(feature = "dot")]
pub use visualize::generate_dot;
