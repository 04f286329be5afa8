//! Timer engine for the Focus Dashboard.
//!
//! This module provides the session countdown:
//! - Countdown with tokio::time::interval, one decrement per second
//! - Tick events carrying the remaining seconds
//! - A single `Expired` event when the countdown reaches zero
//!
//! Re-entry (starting a second countdown while one runs) is guarded by the
//! session controller, not here.

use std::num::NonZeroU32;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use super::clock;
use super::{SessionEvent, SessionEventKind, SessionId};

/// Countdown resolution.
const TICK: Duration = Duration::from_secs(1);

// ============================================================================
// TimerEngine
// ============================================================================

/// Owns the remaining seconds of the current session.
pub struct TimerEngine {
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    /// Remaining seconds, written only by the countdown task
    remaining: watch::Receiver<u32>,
    /// Running countdown task
    task: Option<JoinHandle<()>>,
}

impl TimerEngine {
    /// Creates a stopped engine reporting to `event_tx`.
    pub fn new(event_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        let (_, remaining) = watch::channel(0);
        Self {
            event_tx,
            remaining,
            task: None,
        }
    }

    /// Starts counting down from `initial_seconds`.
    ///
    /// A countdown that is still running is cancelled first.
    pub fn start(&mut self, initial_seconds: NonZeroU32, session: SessionId) {
        self.stop();

        let (remaining_tx, remaining_rx) = watch::channel(initial_seconds.get());
        self.remaining = remaining_rx;

        let event_tx = self.event_tx.clone();
        self.task = Some(tokio::spawn(countdown(
            initial_seconds.get(),
            session,
            remaining_tx,
            event_tx,
        )));

        tracing::debug!(session = %session, seconds = initial_seconds.get(), "countdown started");
    }

    /// Halts the countdown. No tick fires after this returns.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Returns true while the countdown task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Returns the remaining seconds of the current (or last) countdown.
    pub fn remaining_seconds(&self) -> u32 {
        *self.remaining.borrow()
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Counts down to zero, then reports expiry once and exits.
async fn countdown(
    initial_seconds: u32,
    session: SessionId,
    remaining_tx: watch::Sender<u32>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
) {
    let mut ticker = clock::ticker(TICK);
    let mut remaining = initial_seconds;

    while remaining > 0 {
        ticker.tick().await;
        remaining -= 1;
        remaining_tx.send_replace(remaining);

        let tick = SessionEvent::new(
            session,
            SessionEventKind::Tick {
                remaining_seconds: remaining,
            },
        );
        if event_tx.send(tick).is_err() {
            // Controller is gone
            return;
        }
    }

    tracing::debug!(session = %session, "countdown expired");
    let _ = event_tx.send(SessionEvent::new(session, SessionEventKind::Expired));
}

// ============================================================================
// Tests
// ============================================================================
