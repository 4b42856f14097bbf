//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use deadsnip_core::prelude::*;
//! ```

// Graph model
pub use crate::graph::{
    DeclarationAttrs, DeclarationId, FileAttrs, FileId, GcFlags, NodeRef, Project, Span,
    UsageAttrs, UsageKind,
};

// Core engine
pub use crate::mark::{mark, MarkOptions};
pub use crate::postprocess::postprocess;
pub use crate::snipping::{apply_edits, collapse_spans};

// Errors
pub use crate::error::{DeadsnipError, DeadsnipResult};

// Configuration
pub use crate::config::{load_config, DeadsnipConfig};

// Builder API
pub use crate::builder::{AnalysisResult, DeadItem, DeadItemKind, Deadsnip};
pub use crate::logging::RunLog;
pub use crate::manifest::Manifest;

// Fix functionality
#[cfg(feature = "fix")]
pub use crate::fix::{fix_project, FixResult};
