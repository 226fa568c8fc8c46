//! Live status of one processing run.

use shared::domain::{DisplayRef, Phase, ProcessingStatus};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingRecord {
    status: ProcessingStatus,
    progress: u8,
    original_ref: Option<DisplayRef>,
    result_ref: Option<DisplayRef>,
    failure_reason: Option<String>,
}

impl ProcessingRecord {
    pub fn new(original_ref: Option<DisplayRef>) -> Self {
        Self {
            status: ProcessingStatus::Uploading,
            progress: 0,
            original_ref,
            result_ref: None,
            failure_reason: None,
        }
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn original_ref(&self) -> Option<DisplayRef> {
        self.original_ref
    }

    /// Only populated while Completed.
    pub fn result_ref(&self) -> Option<DisplayRef> {
        self.result_ref
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Enters a later `phase` with progress back at 0. Returns whether anything changed;
    /// the current phase, an earlier one, or a terminal record are left alone.
    pub fn begin_phase(&mut self, phase: Phase) -> bool {
        let current = match self.status {
            ProcessingStatus::Uploading => Phase::Uploading,
            ProcessingStatus::Processing => Phase::Processing,
            ProcessingStatus::Completed | ProcessingStatus::Failed => return false,
        };
        if phase <= current {
            if phase < current {
                debug!(?phase, ?current, "ignoring phase that would run backwards");
            }
            return false;
        }
        self.status = phase.status();
        self.progress = 0;
        true
    }

    /// Applies a step of the current phase. Steps from another phase, after a terminal
    /// status, or below the current value are ignored.
    pub fn advance(&mut self, phase: Phase, percent: u8) -> bool {
        if self.status != phase.status() || percent < self.progress {
            return false;
        }
        self.progress = percent.min(100);
        true
    }

    pub fn complete(&mut self, result_ref: DisplayRef) {
        self.status = ProcessingStatus::Completed;
        self.progress = 100;
        self.result_ref = Some(result_ref);
        self.failure_reason = None;
    }

    /// Moves to Failed unless the run already completed.
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if self.status == ProcessingStatus::Completed {
            return false;
        }
        self.status = ProcessingStatus::Failed;
        self.progress = 0;
        self.result_ref = None;
        self.failure_reason = Some(reason.into());
        true
    }

    /// Hands out the references still held by this record, each at most once.
    pub(crate) fn take_refs(&mut self) -> (Option<DisplayRef>, Option<DisplayRef>) {
        (self.original_ref.take(), self.result_ref.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_never_decreases_within_a_phase() {
        let mut record = ProcessingRecord::new(Some(DisplayRef(1)));
        assert!(record.advance(Phase::Uploading, 30));
        assert!(!record.advance(Phase::Uploading, 20));
        assert_eq!(record.progress(), 30);
        assert!(!record.advance(Phase::Processing, 40));

        assert!(record.begin_phase(Phase::Processing));
        assert_eq!(record.progress(), 0);
        assert_eq!(record.status(), ProcessingStatus::Processing);
    }

    #[test]
    fn phases_only_move_forward() {
        let mut record = ProcessingRecord::new(Some(DisplayRef(1)));
        assert!(!record.begin_phase(Phase::Uploading));
        assert!(record.advance(Phase::Uploading, 100));

        assert!(record.begin_phase(Phase::Processing));
        assert!(record.advance(Phase::Processing, 40));
        assert!(!record.begin_phase(Phase::Uploading));
        assert!(!record.begin_phase(Phase::Processing));
        assert_eq!(record.status(), ProcessingStatus::Processing);
        assert_eq!(record.progress(), 40);
        assert!(!record.advance(Phase::Uploading, 100));
    }

    #[test]
    fn result_ref_only_while_completed() {
        let mut record = ProcessingRecord::new(Some(DisplayRef(1)));
        assert!(record.result_ref().is_none());
        record.complete(DisplayRef(1));
        assert_eq!(record.result_ref(), Some(DisplayRef(1)));
        assert_eq!(record.progress(), 100);
        assert!(!record.fail("late fault"));
        assert_eq!(record.result_ref(), Some(DisplayRef(1)));

        let mut record = ProcessingRecord::new(Some(DisplayRef(2)));
        assert!(record.advance(Phase::Uploading, 60));
        assert!(record.fail("boom"));
        assert_eq!(record.status(), ProcessingStatus::Failed);
        assert_eq!(record.progress(), 0);
        assert!(record.result_ref().is_none());
        assert_eq!(record.failure_reason(), Some("boom"));
        assert!(!record.begin_phase(Phase::Uploading));
    }
}
