//! Session lifecycle controller.
//!
//! Owns [`SessionState`] and is the only place that mutates it. The
//! controller runs one event loop that multiplexes user commands, events from
//! the three session components and the dwell deadline:
//!
//! ```text
//! Idle --start--> Active --stop|expired|forced--> Finalizing --dwell--> Idle
//! ```
//!
//! Every handler runs to completion before the next message is taken, so
//! the state guards at the top of each transition are the only re-entrancy
//! protection needed.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

use super::{
    FocusPoller, SessionCommand, SessionEvent, SessionEventKind, SessionId, StopReason,
    TimerEngine, WarningWatcher,
};
use crate::api::FocusService;
use crate::types::{
    resolve_session_seconds, DashboardConfig, FocusSample, SessionRecord, SessionState,
};
use crate::ui::{self, Controls, DashboardView};

// ============================================================================
// SessionController
// ============================================================================

/// Drives one dashboard through any number of sessions.
pub struct SessionController<S, V> {
    service: Arc<S>,
    view: V,
    config: DashboardConfig,
    state: watch::Sender<SessionState>,
    session: SessionId,
    started_at: Option<Instant>,
    dwell_until: Option<Instant>,
    timer: TimerEngine,
    poller: FocusPoller<S>,
    watcher: WarningWatcher<S>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<S: FocusService, V: DashboardView> SessionController<S, V> {
    pub fn new(service: Arc<S>, view: V, config: DashboardConfig) -> Self {
        let (event_tx, events_rx) = mpsc::unbounded_channel();
        let (state, state_rx) = watch::channel(SessionState::Idle);

        let timer = TimerEngine::new(event_tx.clone());
        let poller = FocusPoller::new(
            Arc::clone(&service),
            config.focus_poll_period(),
            event_tx.clone(),
        );
        let watcher = WarningWatcher::new(
            Arc::clone(&service),
            config.warning_poll_period(),
            config.warning_threshold,
            state_rx,
            event_tx,
        );

        Self {
            service,
            view,
            config,
            state,
            session: SessionId::default(),
            started_at: None,
            dwell_until: None,
            timer,
            poller,
            watcher,
            events_rx,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Read-only view of the session state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining_seconds()
    }

    pub fn latest_sample(&self) -> Option<FocusSample> {
        self.poller.latest_sample()
    }

    pub fn warning_count(&self) -> u32 {
        self.watcher.warning_count()
    }

    /// Number of session components (timer, poller, watcher) currently running.
    pub fn running_components(&self) -> usize {
        [
            self.timer.is_running(),
            self.poller.is_running(),
            self.watcher.is_running(),
        ]
        .into_iter()
        .filter(|running| *running)
        .count()
    }

    // ------------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------------

    /// Runs the dashboard until `Quit` arrives or the command channel closes.
    ///
    /// A session still active at that point is stopped and finalized first.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        self.load().await;

        loop {
            let dwell = self.dwell_until;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Quit) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event).await,
                _ = sleep_until(dwell.unwrap_or_else(Instant::now)), if dwell.is_some() => {
                    self.finish_dwell();
                }
            }
        }

        self.shutdown().await;
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        tracing::debug!(?command, state = self.state().as_str(), "command received");
        match command {
            SessionCommand::Start => self.start().await,
            SessionCommand::Stop => self.stop(StopReason::UserRequested).await,
            SessionCommand::Reset => self.reset().await,
            SessionCommand::Quit => self.shutdown().await,
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        if event.session != self.session || !self.state().is_active() {
            tracing::debug!(
                session = %event.session,
                current = %self.session,
                "dropping event from inactive session"
            );
            return;
        }

        match event.kind {
            SessionEventKind::Tick { remaining_seconds } => {
                self.view.set_timer_text(&ui::format_clock(remaining_seconds));
            }
            SessionEventKind::Expired => {
                self.stop(StopReason::Expired).await;
            }
            SessionEventKind::FocusSampled(sample) => {
                let band = sample.band();
                self.view.set_focus_score_text(&sample.score_text());
                self.view.set_status(band.label(), band.css_class());
            }
            SessionEventKind::WarningRaised { count } => {
                self.view.alert(&ui::warning_text(count));
            }
            SessionEventKind::ForceStop { count } => {
                tracing::info!(session = %self.session, warnings = count, "warning threshold reached");
                self.stop(StopReason::Forced).await;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Shows the session length and the idle controls.
    pub async fn load(&mut self) {
        let seconds = self.resolve_duration().await;
        self.view.set_timer_text(&ui::format_clock(seconds.get()));
        self.view.set_controls(Controls::IDLE);
    }

    /// Idle → Active. Ignored in any other state.
    pub async fn start(&mut self) {
        if self.state() != SessionState::Idle {
            tracing::debug!(state = self.state().as_str(), "start ignored");
            return;
        }

        self.view.set_controls(Controls::ACTIVE);

        if let Err(e) = self.service.begin_session().await {
            tracing::warn!("failed to start session: {}", e);
            self.view.set_controls(Controls::IDLE);
            return;
        }

        let seconds = self.resolve_duration().await;

        self.session = self.session.next();
        self.state.send_replace(SessionState::Active);
        self.timer.start(seconds, self.session);
        self.poller.start(self.session);
        self.watcher.start(self.session);
        self.started_at = Some(Instant::now());

        let feed = self.service.video_feed_url();
        self.view.set_timer_text(&ui::format_clock(seconds.get()));
        self.view.set_video_source(Some(feed.as_str()));

        tracing::info!(session = %self.session, seconds = seconds.get(), "session started");
    }

    /// Active → Finalizing. Ignored in any other state.
    ///
    /// Ends the remote session, submits the record and arms the dwell
    /// deadline. Remote failures are logged and never keep the controller
    /// from returning to Idle.
    pub async fn stop(&mut self, reason: StopReason) {
        if !self.state().is_active() {
            tracing::debug!(state = self.state().as_str(), ?reason, "stop ignored");
            return;
        }

        let elapsed = self
            .started_at
            .take()
            .map(|started| started.elapsed())
            .unwrap_or_default();

        self.state.send_replace(SessionState::Finalizing);
        self.timer.stop();
        self.poller.stop();
        self.watcher.stop();

        self.view.set_focus_score_text(ui::EMPTY_SCORE_TEXT);
        self.view.set_status(ui::EMPTY_STATUS_LABEL, "");
        self.view.set_video_source(None);
        self.view.set_controls(Controls::LOCKED);

        tracing::info!(session = %self.session, ?reason, "session stopping");

        let summary = match self.service.end_session().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(session = %self.session, "failed to end session: {}", e);
                None
            }
        };

        let record = SessionRecord::assemble(
            self.config.effective_username(),
            self.config.session_number,
            elapsed,
            Utc::now().date_naive(),
            summary,
        );
        if let Err(e) = self.service.save_session(&record).await {
            tracing::warn!(session = %self.session, "failed to save session: {}", e);
        }

        self.view
            .set_controls(Controls::concluded(reason.is_auto_ended()));
        self.dwell_until = Some(Instant::now() + self.config.dwell());
    }

    /// Stops an active session (waiting out the dwell), then shows a fresh
    /// duration without starting anything. Ignored while Finalizing.
    pub async fn reset(&mut self) {
        match self.state() {
            SessionState::Finalizing => {
                tracing::debug!("reset ignored while finalizing");
                return;
            }
            SessionState::Active => {
                self.stop(StopReason::UserRequested).await;
                self.settle_idle().await;
            }
            SessionState::Idle => {}
        }

        self.load().await;
    }

    /// Finalizing → Idle.
    fn finish_dwell(&mut self) {
        self.dwell_until = None;
        self.state.send_replace(SessionState::Idle);
        self.view.set_controls(Controls::IDLE);
        tracing::info!(session = %self.session, "session finalized");
    }

    /// Waits for a pending dwell deadline, if any, and finishes it.
    async fn settle_idle(&mut self) {
        if let Some(deadline) = self.dwell_until {
            sleep_until(deadline).await;
            self.finish_dwell();
        }
    }

    async fn shutdown(&mut self) {
        if self.state().is_active() {
            self.stop(StopReason::UserRequested).await;
        }
        self.settle_idle().await;
    }

    async fn resolve_duration(&self) -> NonZeroU32 {
        let today = Utc::now().date_naive();
        let lookup = self
            .service
            .session_duration(self.config.effective_username(), today)
            .await;
        if let Err(e) = &lookup {
            tracing::warn!("duration lookup failed, using the default: {}", e);
        }
        resolve_session_seconds(lookup, self.config.default_duration())
    }
}

// ============================================================================
// Tests
// ============================================================================
