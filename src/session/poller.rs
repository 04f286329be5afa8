//! Focus score poller.
//!
//! Requests the live focus score once per period and republishes it as a
//! [`FocusSample`]. At most one request is outstanding: a tick that fires
//! while the previous request is still pending issues nothing, and the
//! pending response is published whenever it lands.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use super::clock;
use super::{SessionEvent, SessionEventKind, SessionId};
use crate::api::{ApiError, FocusService};
use crate::types::FocusSample;

type PendingScore<'a> = Pin<Box<dyn Future<Output = Result<f64, ApiError>> + Send + 'a>>;

/// Polls `GET /get_focus_score` while a session is active.
pub struct FocusPoller<S> {
    service: Arc<S>,
    period: Duration,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    latest: watch::Receiver<Option<FocusSample>>,
    task: Option<JoinHandle<()>>,
}

impl<S: FocusService> FocusPoller<S> {
    pub fn new(
        service: Arc<S>,
        period: Duration,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let (_, latest) = watch::channel(None);
        Self {
            service,
            period,
            event_tx,
            latest,
            task: None,
        }
    }

    /// Starts polling on behalf of `session`.
    pub fn start(&mut self, session: SessionId) {
        self.stop();

        let (latest_tx, latest_rx) = watch::channel(None);
        self.latest = latest_rx;

        self.task = Some(tokio::spawn(poll_focus(
            Arc::clone(&self.service),
            self.period,
            session,
            latest_tx,
            self.event_tx.clone(),
        )));
    }

    /// Halts polling and forgets the last sample. A response still in
    /// flight is dropped with the task.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let (_, cleared) = watch::channel(None);
        self.latest = cleared;
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Most recent sample of the running session, if any arrived yet.
    pub fn latest_sample(&self) -> Option<FocusSample> {
        *self.latest.borrow()
    }
}

impl<S> Drop for FocusPoller<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn poll_focus<S: FocusService>(
    service: Arc<S>,
    period: Duration,
    session: SessionId,
    latest_tx: watch::Sender<Option<FocusSample>>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
) {
    let mut ticker = clock::ticker(period);
    let mut pending: Option<PendingScore<'_>> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if pending.is_some() {
                    tracing::debug!(session = %session, "focus request still pending, skipping tick");
                } else {
                    pending = Some(Box::pin(service.focus_score()));
                }
            }
            result = clock::settle(&mut pending) => {
                pending = None;
                let sample = match result {
                    Ok(score) => FocusSample::from_score(score, Utc::now()),
                    Err(e) => {
                        tracing::warn!(session = %session, "failed to fetch focus score: {}", e);
                        continue;
                    }
                };
                let Some(sample) = sample else {
                    tracing::warn!(session = %session, "discarding non-finite focus score");
                    continue;
                };

                latest_tx.send_replace(Some(sample));
                let event = SessionEvent::new(session, SessionEventKind::FocusSampled(sample));
                if event_tx.send(event).is_err() {
                    return;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
