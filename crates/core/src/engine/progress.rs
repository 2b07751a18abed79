//! Per-run progress counter.

use super::events::EngineEvent;

/// Files handled so far out of the run's total.
///
/// `processed` only moves forward and is capped at `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    processed: usize,
    total: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            total,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// `floor(processed / total * 100)`, or 0 for an empty run.
    pub fn percent_complete(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.processed * 100 / self.total) as u8
    }

    /// Counts one more handled file.
    pub fn advance(&mut self) {
        debug_assert!(self.processed < self.total, "progress advanced past total");
        self.processed = (self.processed + 1).min(self.total);
    }

    pub fn is_finished(&self) -> bool {
        self.processed == self.total
    }

    /// The `ProgressUpdated` event for the current state.
    pub fn to_event(&self) -> EngineEvent {
        EngineEvent::ProgressUpdated {
            processed: self.processed,
            total: self.total,
            percent: self.percent_complete(),
        }
    }
}
