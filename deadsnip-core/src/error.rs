//! Typed error handling for deadsnip.
//!
//! Graph construction problems are collaborator bugs and surface as
//! [`DeadsnipError::Graph`] or [`DeadsnipError::InvalidSpan`] the moment the
//! offending node is created. I/O problems carry the path they happened on.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deadsnip operations.
#[derive(Error, Debug)]
pub enum DeadsnipError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Graph invariant violation (unknown target, foreign file, duplicate file...)
    #[error("Graph error: {message}")]
    Graph { message: String },

    /// Malformed or out-of-range span
    #[error("Invalid span [{full_start}, {start}, {end}): {message}")]
    InvalidSpan {
        full_start: usize,
        start: usize,
        end: usize,
        message: String,
    },

    /// Reference graph manifest could not be read or resolved
    #[error("Manifest error at {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Glob pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

impl DeadsnipError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a graph invariant error.
    pub fn graph(message: impl Into<String>) -> Self {
        Self::Graph {
            message: message.into(),
        }
    }

    pub fn invalid_span(full_start: usize, start: usize, end: usize, message: impl Into<String>) -> Self {
        Self::InvalidSpan {
            full_start,
            start,
            end,
            message: message.into(),
        }
    }

    /// Create a manifest error.
    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a pattern error.
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Manifest { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for deadsnip results.
pub type DeadsnipResult<T> = Result<T, DeadsnipError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DeadsnipResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DeadsnipResult<T> {
        self.map_err(|e| DeadsnipError::io(path, e))
    }
}
