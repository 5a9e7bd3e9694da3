//! Progress reporting and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receives advisory progress updates during a run.
pub trait ProgressReporter {
    /// Called with the completed share of the run, 0 to 100.
    fn report(&self, percent: u32);
}

/// Discards progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _percent: u32) {}
}

/// Shared flag a caller sets to stop a run.
///
/// Clones share the flag, so one clone can be handed to another thread while
/// the run holds the other.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`CancellationToken::cancel`] has been called on
    /// any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Maps one phase's `done / total` onto a slice of the overall percentage.
///
/// Updates are coalesced to at most `steps` notifications per full run.
pub struct ProgressSpan<'a> {
    reporter: &'a dyn ProgressReporter,
    start: u32,
    width: u32,
    steps: u32,
    last_step: Option<u32>,
}

impl<'a> ProgressSpan<'a> {
    /// Creates a span covering `start..=start + width` percent.
    #[must_use]
    pub fn new(reporter: &'a dyn ProgressReporter, start: u32, width: u32, steps: u32) -> Self {
        Self {
            reporter,
            start: start.min(100),
            width: width.min(100 - start.min(100)),
            steps: steps.clamp(1, 100),
            last_step: None,
        }
    }

    /// Records that `done` of `total` units are complete.
    pub fn advance(&mut self, done: usize, total: usize) {
        let percent = self.percent(done, total);
        let step = percent * self.steps / 100;
        if self.last_step != Some(step) || done >= total {
            self.last_step = Some(step);
            self.reporter.report(percent);
        }
    }

    fn percent(&self, done: usize, total: usize) -> u32 {
        if total == 0 || done >= total {
            return self.start + self.width;
        }
        let scaled = u64::from(self.width) * done as u64 / total as u64;
        self.start + u32::try_from(scaled).unwrap_or(self.width)
    }
}
