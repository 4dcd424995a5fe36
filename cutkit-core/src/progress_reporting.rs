//! Busy, progress and alert signals.
//!
//! The runner never touches shared UI state. Every invocation is handed a
//! [`ProgressSink`] and reports through it; a front end that runs several
//! invocations at once decides how their signals combine.
//!
//! # Design Decisions
//! - One small trait with three signals instead of global reporter state
//! - The stderr parser lives in [`ffmpeg_handler`], separate from completion

pub mod ffmpeg_handler;

use std::sync::Arc;

/// Receiver of the signals produced while an invocation runs.
pub trait ProgressSink: Send + Sync {
    /// Raised when a process is spawned, cleared when it exits.
    fn busy(&self, busy: bool);

    /// Percentage of the target duration processed so far, 0..=100.
    fn progress(&self, percent: u32);

    /// Short message meant for the user (failed process, rejected input).
    fn alert(&self, message: &str);
}

/// Shared handle to a sink, cloned into runner threads.
pub type SharedSink = Arc<dyn ProgressSink>;

/// Sink that forwards every signal to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn busy(&self, busy: bool) {
        log::debug!(target: "cutkit::progress", "busy={busy}");
    }

    fn progress(&self, percent: u32) {
        log::info!(target: "cutkit::progress", "Progress: {percent}%");
    }

    fn alert(&self, message: &str) {
        log::error!(target: "cutkit::progress", "{message}");
    }
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn busy(&self, _busy: bool) {}
    fn progress(&self, _percent: u32) {}
    fn alert(&self, _message: &str) {}
}
