//! Dashboard presentation layer.
//!
//! The session controller only ever calls the setters of [`DashboardView`];
//! how they are rendered is up to the implementation:
//! - `terminal`: line-oriented output on stdout
//! - [`RecordingDashboard`]: keeps everything in memory for tests

pub mod terminal;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use terminal::TerminalDashboard;

// ============================================================================
// Controls
// ============================================================================

/// One button of the control bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub enabled: bool,
    pub label: &'static str,
}

impl Control {
    const fn new(enabled: bool, label: &'static str) -> Self {
        Self { enabled, label }
    }
}

/// Enabled flags and labels of the start, stop and reset controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start: Control,
    pub stop: Control,
    pub reset: Control,
}

impl Controls {
    /// No session: start and reset are available.
    pub const IDLE: Controls = Controls {
        start: Control::new(true, "Start"),
        stop: Control::new(false, "Stop"),
        reset: Control::new(true, "Reset"),
    };

    /// Session running: only stop is available.
    pub const ACTIVE: Controls = Controls {
        start: Control::new(false, "Session Started"),
        stop: Control::new(true, "Stop"),
        reset: Control::new(false, "Reset"),
    };

    /// Stop sequence in flight: nothing is available.
    pub const LOCKED: Controls = Controls {
        start: Control::new(false, "Session Started"),
        stop: Control::new(false, "Stop"),
        reset: Control::new(false, "Reset"),
    };

    /// Locked controls showing how the session ended.
    pub fn concluded(auto_ended: bool) -> Controls {
        let label = if auto_ended {
            "Session Complete"
        } else {
            "Session Stopped"
        };
        Controls {
            stop: Control::new(false, label),
            ..Controls::LOCKED
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats seconds as `mm:ss`. Minutes are not capped at 59.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Text of the one-shot alert raised for a new warning.
pub fn warning_text(count: u32) -> String {
    format!("Warning {}: Stay Focused!", count)
}

/// Score text shown while no sample is available.
pub const EMPTY_SCORE_TEXT: &str = "Focus Score: -";

/// Status label shown while no sample is available.
pub const EMPTY_STATUS_LABEL: &str = "Status: -";

// ============================================================================
// DashboardView
// ============================================================================

/// Output surface driven by the session controller.
pub trait DashboardView {
    fn set_timer_text(&mut self, text: &str);

    /// Sets the status label and its classification class (may be empty).
    fn set_status(&mut self, label: &str, class: &str);

    fn set_focus_score_text(&mut self, text: &str);

    fn set_controls(&mut self, controls: Controls);

    /// Shows the live video source, or clears it with `None`.
    fn set_video_source(&mut self, url: Option<&str>);

    /// Surfaces a one-shot alert.
    fn alert(&mut self, message: &str);
}

// ============================================================================
// RecordingDashboard
// ============================================================================

/// Everything a [`RecordingDashboard`] has been told so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub timer_text: String,
    pub status_label: String,
    pub status_class: String,
    pub focus_score_text: String,
    pub controls: Controls,
    pub video_source: Option<String>,
    pub alerts: Vec<String>,
    /// Every status label set, in order
    pub status_history: Vec<String>,
    /// Every control configuration set, in order
    pub controls_history: Vec<Controls>,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            timer_text: String::new(),
            status_label: EMPTY_STATUS_LABEL.to_string(),
            status_class: String::new(),
            focus_score_text: EMPTY_SCORE_TEXT.to_string(),
            controls: Controls::IDLE,
            video_source: None,
            alerts: Vec::new(),
            status_history: Vec::new(),
            controls_history: Vec::new(),
        }
    }
}

/// In-memory view for tests. Clones share the same snapshot, so a test
/// keeps one handle while the controller owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingDashboard {
    inner: Arc<Mutex<DashboardSnapshot>>,
}

impl RecordingDashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DashboardSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DashboardView for RecordingDashboard {
    fn set_timer_text(&mut self, text: &str) {
        self.lock().timer_text = text.to_string();
    }

    fn set_status(&mut self, label: &str, class: &str) {
        let mut snapshot = self.lock();
        snapshot.status_label = label.to_string();
        snapshot.status_class = class.to_string();
        snapshot.status_history.push(label.to_string());
    }

    fn set_focus_score_text(&mut self, text: &str) {
        self.lock().focus_score_text = text.to_string();
    }

    fn set_controls(&mut self, controls: Controls) {
        let mut snapshot = self.lock();
        snapshot.controls = controls;
        snapshot.controls_history.push(controls);
    }

    fn set_video_source(&mut self, url: Option<&str>) {
        self.lock().video_source = url.map(str::to_string);
    }

    fn alert(&mut self, message: &str) {
        self.lock().alerts.push(message.to_string());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_clock() {
            assert_eq!(format_clock(0), "00:00");
            assert_eq!(format_clock(59), "00:59");
            assert_eq!(format_clock(60), "01:00");
            assert_eq!(format_clock(1500), "25:00");
            assert_eq!(format_clock(6000), "100:00");
        }

        #[test]
        fn test_warning_text() {
            assert_eq!(warning_text(2), "Warning 2: Stay Focused!");
        }
    }

    mod controls_tests {
        use super::*;

        #[test]
        fn test_idle_controls() {
            assert!(Controls::IDLE.start.enabled);
            assert_eq!(Controls::IDLE.start.label, "Start");
            assert!(!Controls::IDLE.stop.enabled);
            assert!(Controls::IDLE.reset.enabled);
        }

        #[test]
        fn test_active_controls() {
            assert!(!Controls::ACTIVE.start.enabled);
            assert_eq!(Controls::ACTIVE.start.label, "Session Started");
            assert!(Controls::ACTIVE.stop.enabled);
            assert!(!Controls::ACTIVE.reset.enabled);
        }

        #[test]
        fn test_concluded_controls_are_locked() {
            let complete = Controls::concluded(true);
            assert_eq!(complete.stop.label, "Session Complete");
            assert!(!complete.start.enabled && !complete.stop.enabled && !complete.reset.enabled);

            assert_eq!(Controls::concluded(false).stop.label, "Session Stopped");
        }
    }

    mod recording_tests {
        use super::*;

        #[test]
        fn test_clones_share_snapshot() {
            let recorder = RecordingDashboard::new();
            let mut view = recorder.clone();

            view.set_timer_text("25:00");
            view.set_status("Status: Focused", "status-focused");
            view.alert("Warning 1: Stay Focused!");
            view.set_video_source(Some("http://127.0.0.1:5000/video_feed"));

            let snapshot = recorder.snapshot();
            assert_eq!(snapshot.timer_text, "25:00");
            assert_eq!(snapshot.status_class, "status-focused");
            assert_eq!(snapshot.alerts.len(), 1);
            assert_eq!(snapshot.status_history, vec!["Status: Focused"]);
            assert!(snapshot.video_source.is_some());
        }

        #[test]
        fn test_controls_history() {
            let recorder = RecordingDashboard::new();
            let mut view = recorder.clone();

            view.set_controls(Controls::ACTIVE);
            view.set_controls(Controls::IDLE);

            assert_eq!(
                recorder.snapshot().controls_history,
                vec![Controls::ACTIVE, Controls::IDLE]
            );
        }
    }
}
