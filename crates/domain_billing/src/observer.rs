//! Run observation
//!
//! The orchestrator never prints. Progress and per-invoice payment failures
//! are pushed to a [`RunObserver`] chosen by the caller; a CLI can drive a
//! progress bar with it, a test can record the calls.

use std::fmt;

use crate::invoice::Invoice;

/// The stages of a billing run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStage {
    Load,
    Generate,
    Authorize,
    Notify,
    Export,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Load => "load",
            RunStage::Generate => "generate",
            RunStage::Authorize => "authorize",
            RunStage::Notify => "notify",
            RunStage::Export => "export",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives progress and recoverable errors from a billing run
///
/// Observer methods cannot fail. An implementation that can fail internally
/// (a broken terminal, a closed channel) must swallow that failure itself.
pub trait RunObserver: Send + Sync {
    /// A stage is about to process `total` items
    fn on_stage_started(&self, _stage: RunStage, _total: usize) {}

    /// Item `current` of `total` finished in `stage`. `current` starts at 1.
    ///
    /// Reported for the generate and authorize stages.
    fn on_progress(&self, _stage: RunStage, _current: usize, _total: usize) {}

    /// Payment authorization for `invoice` failed; the run continues
    fn on_authorization_failed(&self, _invoice: &Invoice, _reason: &str) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Observer assembled from two closures, one per sink
pub struct CallbackObserver<P, E>
where
    P: Fn(RunStage, usize, usize) + Send + Sync,
    E: Fn(&Invoice, &str) + Send + Sync,
{
    on_progress: P,
    on_error: E,
}

impl<P, E> CallbackObserver<P, E>
where
    P: Fn(RunStage, usize, usize) + Send + Sync,
    E: Fn(&Invoice, &str) + Send + Sync,
{
    pub fn new(on_progress: P, on_error: E) -> Self {
        Self { on_progress, on_error }
    }
}

impl<P, E> RunObserver for CallbackObserver<P, E>
where
    P: Fn(RunStage, usize, usize) + Send + Sync,
    E: Fn(&Invoice, &str) + Send + Sync,
{
    fn on_progress(&self, stage: RunStage, current: usize, total: usize) {
        (self.on_progress)(stage, current, total)
    }

    fn on_authorization_failed(&self, invoice: &Invoice, reason: &str) {
        (self.on_error)(invoice, reason)
    }
}
