//! Warning watcher.
//!
//! Polls `GET /warning_status` on a fixed cadence. The watcher owns the
//! session's warning count: it only ever moves up, one alert is raised per
//! increase, and once the count reaches the threshold a forced stop is
//! requested for as long as the session is still Active.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use super::clock;
use super::{SessionEvent, SessionEventKind, SessionId};
use crate::api::{ApiError, FocusService};
use crate::types::SessionState;

type PendingCount<'a> = Pin<Box<dyn Future<Output = Result<u32, ApiError>> + Send + 'a>>;

/// Watches the remote warning count during a session.
pub struct WarningWatcher<S> {
    service: Arc<S>,
    period: Duration,
    threshold: u32,
    state: watch::Receiver<SessionState>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    count: watch::Receiver<u32>,
    task: Option<JoinHandle<()>>,
}

impl<S: FocusService> WarningWatcher<S> {
    /// `state` is the controller's published session state; forced stops
    /// are only requested while it reads Active.
    pub fn new(
        service: Arc<S>,
        period: Duration,
        threshold: u32,
        state: watch::Receiver<SessionState>,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let (_, count) = watch::channel(0);
        Self {
            service,
            period,
            threshold,
            state,
            event_tx,
            count,
            task: None,
        }
    }

    /// Starts watching on behalf of `session`. The warning count restarts at 0.
    pub fn start(&mut self, session: SessionId) {
        self.stop();

        let (count_tx, count_rx) = watch::channel(0);
        self.count = count_rx;

        self.task = Some(tokio::spawn(watch_warnings(
            Arc::clone(&self.service),
            self.period,
            self.threshold,
            session,
            self.state.clone(),
            count_tx,
            self.event_tx.clone(),
        )));
    }

    /// Halts watching. The last count stays readable until the next start.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Warning count of the current (or last) session.
    pub fn warning_count(&self) -> u32 {
        *self.count.borrow()
    }
}

impl<S> Drop for WarningWatcher<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn watch_warnings<S: FocusService>(
    service: Arc<S>,
    period: Duration,
    threshold: u32,
    session: SessionId,
    state: watch::Receiver<SessionState>,
    count_tx: watch::Sender<u32>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
) {
    let mut ticker = clock::ticker(period);
    let mut pending: Option<PendingCount<'_>> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if pending.is_none() {
                    pending = Some(Box::pin(service.warning_count()));
                }
            }
            result = clock::settle(&mut pending) => {
                pending = None;
                let warnings = match result {
                    Ok(warnings) => warnings,
                    Err(e) => {
                        tracing::debug!(session = %session, "failed to fetch warning status: {}", e);
                        continue;
                    }
                };

                let mut events = Vec::new();

                let last_seen = *count_tx.borrow();
                if warnings > last_seen {
                    count_tx.send_replace(warnings);
                    tracing::info!(session = %session, warnings, "warning count increased");
                    events.push(SessionEventKind::WarningRaised { count: warnings });
                }

                if warnings >= threshold && state.borrow().is_active() {
                    events.push(SessionEventKind::ForceStop { count: warnings });
                }

                for kind in events {
                    if event_tx.send(SessionEvent::new(session, kind)).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
