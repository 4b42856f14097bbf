//! Structured logging built on **tracing**.
//!
//! The binary installs the process-wide subscriber once with
//! [`init_structured_logging`]. Library code never logs through ambient
//! helpers: every component receives a [`RunLog`], created once per run and
//! dropped when the run ends, and all events are emitted inside its span.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn, Span};

/// Initializes the global tracing subscriber.
///
/// Call *once* at program start. Output goes to stderr so stdout stays clean
/// for reports.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=deadsnip_core=debug`)
pub fn init_structured_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_ansi(false)
            .with_level(true)
            .with_target(true)
            .with_current_span(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Renders `path` relative to `base` when possible.
pub fn loggable_filename(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Logging sink for a single dead code elimination run.
///
/// Owns the `deadsnip_run` span; every event is recorded inside it so a
/// subscriber can group one run's output.
#[derive(Debug, Clone)]
pub struct RunLog {
    span: Span,
    base: PathBuf,
}

impl RunLog {
    /// Create a sink for a run rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let span = tracing::info_span!("deadsnip_run", root = %base.display());
        Self { span, base }
    }

    /// A sink that records nothing.
    pub fn disabled() -> Self {
        Self {
            span: Span::none(),
            base: PathBuf::new(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn name(&self, filename: &str) -> String {
        loggable_filename(Path::new(filename), &self.base)
    }

    pub fn file(&self, filename: &str, is_entrypoint: bool) {
        let _guard = self.span.enter();
        debug!(event = "FILE", file = %self.name(filename), entrypoint = is_entrypoint);
    }

    pub fn declaration(&self, filename: &str, name: Option<&str>, is_export: bool, start: usize) {
        let _guard = self.span.enter();
        let kind = if is_export { "EXPORT" } else { "LOCAL" };
        debug!(
            event = kind,
            file = %self.name(filename),
            name = name.unwrap_or("<statement>"),
            start
        );
    }

    /// A usage attributed to a declaration inside `from_file`.
    pub fn usage(&self, from_file: &str, from: Option<&str>, target_file: &str, target: Option<&str>) {
        let _guard = self.span.enter();
        debug!(
            event = "USAGE",
            from_file = %self.name(from_file),
            from = from.unwrap_or("<statement>"),
            target_file = %self.name(target_file),
            target = target.unwrap_or("<statement>")
        );
    }

    /// A usage that lies outside every known declaration of `from_file`.
    pub fn orphaned_usage(&self, from_file: &str, location: usize, target_file: &str, target: Option<&str>) {
        let _guard = self.span.enter();
        debug!(
            event = "ORPHANED_USAGE",
            from_file = %self.name(from_file),
            location,
            target_file = %self.name(target_file),
            target = target.unwrap_or("<statement>")
        );
    }

    pub fn file_edited(&self, filename: &str, lines_removed: usize) {
        let _guard = self.span.enter();
        info!(event = "EDIT", file = %self.name(filename), lines_removed);
    }

    pub fn file_deleted(&self, filename: &str) {
        let _guard = self.span.enter();
        info!(event = "DELETE", file = %self.name(filename));
    }

    pub fn info(&self, message: &str) {
        let _guard = self.span.enter();
        info!(detail = %message);
    }

    pub fn warn(&self, message: &str) {
        let _guard = self.span.enter();
        warn!(detail = %message);
    }
}
