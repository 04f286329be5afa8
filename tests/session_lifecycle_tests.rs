//! Lifecycle tests for the session controller.
//!
//! These tests run the full controller event loop against a scripted
//! service and a recording dashboard, on a paused clock:
//! - A session that runs out on its own
//! - User, forced and repeated stops
//! - Warning accounting across sessions
//! - Remote failures during start and finalization

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use focus_dashboard::types::SessionSummary;
use focus_dashboard::{
    Controls, DashboardConfig, MockFocusService, RecordingDashboard, SessionCommand,
    SessionController, SessionState,
};

type Controller = SessionController<MockFocusService, RecordingDashboard>;

// ============================================================================
// Test Helpers
// ============================================================================

/// A running dashboard and the handles needed to observe it.
struct Dashboard {
    mock: Arc<MockFocusService>,
    recorder: RecordingDashboard,
    state: watch::Receiver<SessionState>,
    commands: mpsc::Sender<SessionCommand>,
    handle: JoinHandle<Controller>,
}

impl Dashboard {
    fn launch(mock: MockFocusService) -> Self {
        let mock = Arc::new(mock);
        let recorder = RecordingDashboard::new();
        let config = DashboardConfig::default().with_username(Some("alice".to_string()));
        let controller = SessionController::new(Arc::clone(&mock), recorder.clone(), config);
        let state = controller.subscribe();

        let (commands, rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            let mut controller = controller;
            controller.run(rx).await;
            controller
        });

        Self {
            mock,
            recorder,
            state,
            commands,
            handle,
        }
    }

    async fn send(&self, command: SessionCommand) {
        self.commands.send(command).await.unwrap();
        // Let the controller pick it up
        sleep(Duration::from_millis(10)).await;
    }

    fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Quits and hands the controller back for inspection.
    async fn quit(self) -> Controller {
        self.commands.send(SessionCommand::Quit).await.unwrap();
        self.handle.await.unwrap()
    }
}

fn warning_alerts(recorder: &RecordingDashboard) -> Vec<String> {
    recorder.snapshot().alerts
}

// ============================================================================
// Expiry
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_one_minute_session_expires_and_returns_to_idle() {
    let mock = MockFocusService::new();
    mock.set_duration_minutes(Some(1.0));
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    assert_eq!(dashboard.state(), SessionState::Active);
    assert_eq!(dashboard.recorder.snapshot().timer_text, "01:00");

    sleep(Duration::from_millis(59_000)).await;
    assert_eq!(dashboard.state(), SessionState::Active);
    assert_eq!(dashboard.recorder.snapshot().timer_text, "00:01");

    sleep(Duration::from_secs(1)).await;
    assert_eq!(dashboard.state(), SessionState::Finalizing);
    let snapshot = dashboard.recorder.snapshot();
    assert_eq!(snapshot.timer_text, "00:00");
    assert_eq!(snapshot.controls, Controls::concluded(true));
    assert_eq!(snapshot.controls.stop.label, "Session Complete");

    let records = dashboard.mock.saved_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].duration_completed_minutes, 1);
    assert_eq!(records[0].username, "alice");

    sleep(Duration::from_millis(1600)).await;
    assert_eq!(dashboard.state(), SessionState::Idle);
    assert_eq!(dashboard.recorder.snapshot().controls, Controls::IDLE);

    let controller = dashboard.quit().await;
    assert_eq!(controller.running_components(), 0);
}

// ============================================================================
// Components follow the session
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_nothing_polls_outside_an_active_session() {
    let dashboard = Dashboard::launch(MockFocusService::new());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(dashboard.mock.focus_call_count(), 0);
    assert_eq!(dashboard.mock.warning_call_count(), 0);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_secs(4)).await;
    assert!(dashboard.mock.focus_call_count() > 0);
    assert!(dashboard.mock.warning_call_count() > 0);

    dashboard.send(SessionCommand::Stop).await;
    let focus_calls = dashboard.mock.focus_call_count();
    let warning_calls = dashboard.mock.warning_call_count();

    sleep(Duration::from_secs(10)).await;
    assert_eq!(dashboard.state(), SessionState::Idle);
    assert_eq!(dashboard.mock.focus_call_count(), focus_calls);
    assert_eq!(dashboard.mock.warning_call_count(), warning_calls);

    let controller = dashboard.quit().await;
    assert_eq!(controller.running_components(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_focus_scores_are_classified() {
    let mock = MockFocusService::new();
    mock.push_focus_scores([0.8, 0.5, 0.2]);
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_millis(3500)).await;

    let snapshot = dashboard.recorder.snapshot();
    assert_eq!(
        snapshot.status_history,
        vec![
            "Status: Focused",
            "Status: Partially Focused",
            "Status: Not Focused"
        ]
    );
    assert_eq!(snapshot.status_class, "status-not-focused");
    assert_eq!(snapshot.focus_score_text, "Focus Score: 20.0%");
}

#[tokio::test(start_paused = true)]
async fn test_late_focus_response_is_discarded_after_stop() {
    let mock = MockFocusService::new();
    mock.push_focus_scores([0.9]);
    mock.set_focus_delay(Duration::from_secs(2));
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_millis(1500)).await;
    dashboard.send(SessionCommand::Stop).await;
    sleep(Duration::from_secs(5)).await;

    let snapshot = dashboard.recorder.snapshot();
    assert_eq!(snapshot.status_history, vec!["Status: -"]);
    assert_eq!(snapshot.focus_score_text, "Focus Score: -");
}

// ============================================================================
// Stops
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_stop_twice_submits_one_record() {
    let dashboard = Dashboard::launch(MockFocusService::new());

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_secs(3)).await;
    dashboard.send(SessionCommand::Stop).await;
    dashboard.send(SessionCommand::Stop).await;
    sleep(Duration::from_secs(2)).await;

    assert_eq!(dashboard.mock.end_call_count(), 1);
    assert_eq!(dashboard.mock.saved_records().len(), 1);
    assert_eq!(dashboard.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_user_stop_is_labelled_stopped() {
    let dashboard = Dashboard::launch(MockFocusService::new());

    dashboard.send(SessionCommand::Start).await;
    dashboard.send(SessionCommand::Stop).await;

    let snapshot = dashboard.recorder.snapshot();
    assert_eq!(snapshot.controls.stop.label, "Session Stopped");
    assert_eq!(snapshot.video_source, None);
    assert_eq!(dashboard.state(), SessionState::Finalizing);
}

#[tokio::test(start_paused = true)]
async fn test_commands_are_ignored_while_finalizing() {
    let dashboard = Dashboard::launch(MockFocusService::new());

    dashboard.send(SessionCommand::Start).await;
    dashboard.send(SessionCommand::Stop).await;
    dashboard.send(SessionCommand::Start).await;
    dashboard.send(SessionCommand::Reset).await;

    assert_eq!(dashboard.state(), SessionState::Finalizing);
    assert_eq!(dashboard.mock.begin_call_count(), 1);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(dashboard.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_active_is_ignored() {
    let dashboard = Dashboard::launch(MockFocusService::new());

    dashboard.send(SessionCommand::Start).await;
    dashboard.send(SessionCommand::Start).await;

    assert_eq!(dashboard.mock.begin_call_count(), 1);
    assert_eq!(dashboard.recorder.snapshot().controls, Controls::ACTIVE);
}

#[tokio::test(start_paused = true)]
async fn test_quit_finalizes_active_session() {
    let dashboard = Dashboard::launch(MockFocusService::new());
    let mock = Arc::clone(&dashboard.mock);

    dashboard.send(SessionCommand::Start).await;
    let controller = dashboard.quit().await;

    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.running_components(), 0);
    assert_eq!(mock.saved_records().len(), 1);
}

// ============================================================================
// Warnings
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_warning_threshold_forces_stop() {
    let mock = MockFocusService::new();
    mock.push_warnings([0, 1, 2]);
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_millis(4500)).await;
    assert_eq!(
        warning_alerts(&dashboard.recorder),
        vec!["Warning 1: Stay Focused!"]
    );
    assert_eq!(dashboard.state(), SessionState::Active);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(dashboard.state(), SessionState::Finalizing);
    assert_eq!(
        dashboard.recorder.snapshot().controls.stop.label,
        "Session Stopped"
    );

    // Reads of 2 keep coming back; nothing new is raised
    sleep(Duration::from_secs(10)).await;
    assert_eq!(
        warning_alerts(&dashboard.recorder),
        vec!["Warning 1: Stay Focused!", "Warning 2: Stay Focused!"]
    );
    assert_eq!(dashboard.mock.saved_records().len(), 1);
    assert_eq!(dashboard.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_warning_count_restarts_with_each_session() {
    let mock = MockFocusService::new();
    mock.push_warnings([1]);
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_millis(2500)).await;
    dashboard.send(SessionCommand::Stop).await;
    sleep(Duration::from_secs(2)).await;

    // The service still reports 1; a fresh session counts it again
    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_millis(2500)).await;

    assert_eq!(
        warning_alerts(&dashboard.recorder),
        vec!["Warning 1: Stay Focused!", "Warning 1: Stay Focused!"]
    );
    assert_eq!(dashboard.state(), SessionState::Active);
}

// ============================================================================
// Remote failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_failed_duration_lookup_falls_back_to_25_minutes() {
    let mock = MockFocusService::new();
    mock.set_duration_minutes(None);
    let dashboard = Dashboard::launch(mock);

    sleep(Duration::from_millis(10)).await;
    assert_eq!(dashboard.recorder.snapshot().timer_text, "25:00");

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(dashboard.recorder.snapshot().timer_text, "24:59");

    let controller = dashboard.quit().await;
    assert_eq!(controller.remaining_seconds(), 1499);
}

#[tokio::test(start_paused = true)]
async fn test_begin_failure_keeps_dashboard_idle() {
    let mock = MockFocusService::new();
    mock.set_should_fail_begin(true);
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_secs(3)).await;

    assert_eq!(dashboard.state(), SessionState::Idle);
    assert_eq!(dashboard.mock.focus_call_count(), 0);
    assert_eq!(
        dashboard.recorder.snapshot().controls_history,
        vec![Controls::IDLE, Controls::ACTIVE, Controls::IDLE]
    );
}

#[tokio::test(start_paused = true)]
async fn test_finalize_failures_still_return_to_idle() {
    let mock = MockFocusService::new();
    mock.set_summary(None);
    mock.set_should_fail_save(true);
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    dashboard.send(SessionCommand::Stop).await;
    sleep(Duration::from_secs(2)).await;

    assert_eq!(dashboard.state(), SessionState::Idle);
    let records = dashboard.mock.saved_records();
    assert_eq!(records[0].average_focus_score, None);
    assert_eq!(records[0].focus_percentage, None);
}

#[tokio::test(start_paused = true)]
async fn test_summary_is_saved_with_record() {
    let mock = MockFocusService::new();
    mock.set_summary(Some(SessionSummary {
        average_focus_score: Some(0.62),
        focus_percentage: Some(71.5),
    }));
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_secs(125)).await;
    dashboard.send(SessionCommand::Stop).await;

    let record = dashboard.mock.saved_records().remove(0);
    assert_eq!(record.duration_completed_minutes, 2);
    assert_eq!(record.average_focus_score, Some(0.62));
    assert_eq!(record.focus_percentage, Some(71.5));
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reset_while_active_stops_and_reloads() {
    let mock = MockFocusService::new();
    mock.set_duration_minutes(Some(10.0));
    let dashboard = Dashboard::launch(mock);

    dashboard.send(SessionCommand::Start).await;
    sleep(Duration::from_secs(5)).await;
    assert_eq!(dashboard.recorder.snapshot().timer_text, "09:55");

    dashboard.send(SessionCommand::Reset).await;
    sleep(Duration::from_secs(2)).await;

    assert_eq!(dashboard.state(), SessionState::Idle);
    assert_eq!(dashboard.mock.saved_records().len(), 1);
    let snapshot = dashboard.recorder.snapshot();
    assert_eq!(snapshot.timer_text, "10:00");
    assert_eq!(snapshot.controls, Controls::IDLE);
}
