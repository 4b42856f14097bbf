//! Cooperative progress checkpoints.
//!
//! Long loops (manifest ingestion, marking) call [`Checkpoint::tick`] once per
//! unit of work. The callback fires when more than [`TICK_BUDGET`] ticks or
//! more than [`TIME_BUDGET`] have passed since it last fired. The callback's
//! only job is reporting; the core never branches on it.

use std::fmt;
use std::time::{Duration, Instant};

/// Ticks between callback invocations.
pub const TICK_BUDGET: usize = 100;

/// Wall-clock time between callback invocations.
pub const TIME_BUDGET: Duration = Duration::from_millis(100);

/// Which part of the run is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ingest,
    Mark,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest => write!(f, "ingest"),
            Self::Mark => write!(f, "mark"),
        }
    }
}

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub files: usize,
    pub declarations: usize,
    pub analyzed_usages: usize,
    pub marked_nodes: usize,
}

impl Progress {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            files: 0,
            declarations: 0,
            analyzed_usages: 0,
            marked_nodes: 0,
        }
    }
}

type Callback<'a> = Box<dyn FnMut(&Progress) + 'a>;

/// Rate-limited progress reporter.
pub struct Checkpoint<'a> {
    callback: Option<Callback<'a>>,
    ticks: usize,
    last_fired: Instant,
}

impl<'a> Checkpoint<'a> {
    pub fn new(callback: impl FnMut(&Progress) + 'a) -> Self {
        Self {
            callback: Some(Box::new(callback)),
            ticks: 0,
            last_fired: Instant::now(),
        }
    }

    /// A checkpoint that never reports.
    pub fn disabled() -> Self {
        Self {
            callback: None,
            ticks: 0,
            last_fired: Instant::now(),
        }
    }

    /// Count one unit of work; report if the budget is exhausted.
    ///
    /// Returns whether the callback fired.
    pub fn tick(&mut self, progress: &Progress) -> bool {
        let Some(callback) = self.callback.as_mut() else {
            return false;
        };
        self.ticks += 1;
        if self.ticks <= TICK_BUDGET && self.last_fired.elapsed() <= TIME_BUDGET {
            return false;
        }
        callback(progress);
        self.ticks = 0;
        self.last_fired = Instant::now();
        true
    }

    /// Report unconditionally (end of a phase).
    pub fn flush(&mut self, progress: &Progress) {
        if let Some(callback) = self.callback.as_mut() {
            callback(progress);
            self.ticks = 0;
            self.last_fired = Instant::now();
        }
    }
}

impl Default for Checkpoint<'_> {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Checkpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpoint")
            .field("enabled", &self.callback.is_some())
            .field("ticks", &self.ticks)
            .finish()
    }
}
