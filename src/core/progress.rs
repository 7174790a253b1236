//! Scan progress state and reporting.
//!
//! # Public API
//! - [`ScanProgress`]: Current phase message and percentage (0-100)
//! - [`ProgressReporter`]: Observer notified on every change
//! - [`NoOpProgressReporter`]: Reporter for contexts that don't display progress
//! - [`ProgressTracker`]: Owns the state and forwards updates to a reporter
//!
//! A failed scan always ends at 0 with an error message; a successful terminal
//! phase always ends at 100.

/// Percentage used when a phase message is set without an explicit value
pub const DEFAULT_PHASE_PROGRESS: u8 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub phase: Option<String>,
    pub progress: u8,
}

impl ScanProgress {
    /// Set the phase. Without an explicit value progress becomes 50 for a
    /// message and 0 when clearing.
    pub fn set_phase(&mut self, phase: Option<&str>, progress: Option<u8>) {
        let default = if phase.is_some() {
            DEFAULT_PHASE_PROGRESS
        } else {
            0
        };
        self.phase = phase.map(str::to_string);
        self.progress = progress.unwrap_or(default).min(100);
    }

    pub fn is_complete(&self) -> bool {
        self.progress == 100
    }
}

/// Receives every progress change
pub trait ProgressReporter {
    fn report(&self, progress: &ScanProgress);
}

#[derive(Debug, Clone)]
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report(&self, _progress: &ScanProgress) {}
}

pub struct ProgressTracker {
    state: ScanProgress,
    reporter: Box<dyn ProgressReporter>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(Box::new(NoOpProgressReporter))
    }
}

impl ProgressTracker {
    pub fn new(reporter: Box<dyn ProgressReporter>) -> Self {
        Self {
            state: ScanProgress::default(),
            reporter,
        }
    }

    pub fn current(&self) -> &ScanProgress {
        &self.state
    }

    pub fn set_phase(&mut self, phase: Option<&str>, progress: Option<u8>) {
        self.state.set_phase(phase, progress);
        log::debug!("Progress {}%: {:?}", self.state.progress, self.state.phase);
        self.reporter.report(&self.state);
    }

    pub fn advance(&mut self, phase: &str, progress: u8) {
        self.set_phase(Some(phase), Some(progress));
    }

    pub fn complete(&mut self, phase: &str) {
        self.set_phase(Some(phase), Some(100));
    }

    pub fn fail(&mut self, message: &str) {
        self.set_phase(Some(message), Some(0));
    }

    pub fn clear(&mut self) {
        self.set_phase(None, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<ScanProgress>>>);

    impl ProgressReporter for Recorder {
        fn report(&self, progress: &ScanProgress) {
            self.0.borrow_mut().push(progress.clone());
        }
    }

    #[test]
    fn test_default_progress_values() {
        let mut state = ScanProgress::default();
        state.set_phase(Some("Scanning"), None);
        assert_eq!(state.progress, 50);

        state.set_phase(None, None);
        assert_eq!(state, ScanProgress::default());
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut state = ScanProgress::default();
        state.set_phase(Some("Done"), Some(250));
        assert!(state.is_complete());
    }

    #[test]
    fn test_tracker_reports_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut tracker = ProgressTracker::new(Box::new(Recorder(seen.clone())));

        tracker.advance("Loading cache", 10);
        tracker.fail("Scan failed");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].progress, 10);
        assert_eq!(seen[1].progress, 0);
        assert_eq!(seen[1].phase.as_deref(), Some("Scan failed"));
        assert_eq!(tracker.current(), &seen[1]);
    }
}
