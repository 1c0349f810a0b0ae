//! Diagnostic sinks for non-fatal engine events

use std::fmt;
use std::sync::Mutex;

use crate::error::ChunkingWarning;

/// Receives warnings and debug events from the engine
///
/// Sinks are shared across worker threads and must be `Send + Sync`.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per warning, in the order warnings were raised
    fn warning(&self, warning: &ChunkingWarning);

    /// Fine-grained progress events; ignored by default
    fn debug(&self, _args: fmt::Arguments<'_>) {}
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn warning(&self, warning: &ChunkingWarning) {
        log::warn!("{warning}");
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        log::debug!("{args}");
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn warning(&self, _warning: &ChunkingWarning) {}
}

/// Keeps warnings in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<ChunkingWarning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings received so far
    pub fn warnings(&self) -> Vec<ChunkingWarning> {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Removes and returns the warnings received so far
    pub fn take(&self) -> Vec<ChunkingWarning> {
        std::mem::take(
            &mut *self
                .warnings
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl DiagnosticSink for CollectingSink {
    fn warning(&self, warning: &ChunkingWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(warning.clone());
    }
}
