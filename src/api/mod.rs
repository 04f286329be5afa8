//! Client side of the focus-scoring service.
//!
//! The session controller never talks HTTP directly; it goes through the
//! [`FocusService`] trait so that tests can script the service with
//! [`MockFocusService`].

pub mod client;
pub mod error;

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;

use crate::types::{
    Credentials, DurationResponse, LoginResponse, SessionRecord, SessionSummary,
};

pub use client::HttpFocusService;
pub use error::ApiError;

/// Remote calls the dashboard depends on.
///
/// Futures are `Send` so pollers can run as spawned tasks.
pub trait FocusService: Send + Sync + 'static {
    /// `POST /submit`
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `POST /duration`
    fn session_duration(
        &self,
        username: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<DurationResponse, ApiError>> + Send;

    /// `GET /start_session`
    fn begin_session(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /get_focus_score`
    fn focus_score(&self) -> impl Future<Output = Result<f64, ApiError>> + Send;

    /// `GET /stop_session`
    fn end_session(&self) -> impl Future<Output = Result<SessionSummary, ApiError>> + Send;

    /// `POST /save-session`
    fn save_session(
        &self,
        record: &SessionRecord,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /warning_status`
    fn warning_count(&self) -> impl Future<Output = Result<u32, ApiError>> + Send;

    /// URL of the live video feed, only used as a display source.
    fn video_feed_url(&self) -> String;
}

// ============================================================================
// MockFocusService
// ============================================================================

/// Scriptable in-memory service for testing.
///
/// Focus scores are served from a queue and fail once it runs dry. Warning
/// counts are served from a queue and the last value repeats afterwards.
#[derive(Debug)]
pub struct MockFocusService {
    duration_minutes: Mutex<Option<f64>>,
    summary: Mutex<Option<SessionSummary>>,
    login_response: Mutex<Option<LoginResponse>>,
    focus_scores: Mutex<VecDeque<f64>>,
    focus_delay: Mutex<Duration>,
    warnings: Mutex<VecDeque<u32>>,
    warning_delay: Mutex<Duration>,
    last_warning: Mutex<u32>,
    saved_records: Mutex<Vec<SessionRecord>>,
    should_fail_begin: AtomicBool,
    should_fail_save: AtomicBool,
    duration_calls: AtomicUsize,
    begin_calls: AtomicUsize,
    end_calls: AtomicUsize,
    focus_calls: AtomicUsize,
    warning_calls: AtomicUsize,
    focus_in_flight: AtomicUsize,
    max_focus_in_flight: AtomicUsize,
    warning_in_flight: AtomicUsize,
    max_warning_in_flight: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockFocusService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            duration_minutes: Mutex::new(Some(25.0)),
            summary: Mutex::new(Some(SessionSummary::default())),
            login_response: Mutex::new(None),
            focus_scores: Mutex::new(VecDeque::new()),
            focus_delay: Mutex::new(Duration::ZERO),
            warnings: Mutex::new(VecDeque::new()),
            warning_delay: Mutex::new(Duration::ZERO),
            last_warning: Mutex::new(0),
            saved_records: Mutex::new(Vec::new()),
            should_fail_begin: AtomicBool::new(false),
            should_fail_save: AtomicBool::new(false),
            duration_calls: AtomicUsize::new(0),
            begin_calls: AtomicUsize::new(0),
            end_calls: AtomicUsize::new(0),
            focus_calls: AtomicUsize::new(0),
            warning_calls: AtomicUsize::new(0),
            focus_in_flight: AtomicUsize::new(0),
            max_focus_in_flight: AtomicUsize::new(0),
            warning_in_flight: AtomicUsize::new(0),
            max_warning_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sets the duration answer; `None` makes the lookup fail.
    pub fn set_duration_minutes(&self, minutes: Option<f64>) {
        *lock(&self.duration_minutes) = minutes;
    }

    /// Sets the end-session answer; `None` makes the call fail.
    pub fn set_summary(&self, summary: Option<SessionSummary>) {
        *lock(&self.summary) = summary;
    }

    /// Sets the login answer; `None` makes the call fail.
    pub fn set_login_response(&self, response: Option<LoginResponse>) {
        *lock(&self.login_response) = response;
    }

    pub fn push_focus_scores(&self, scores: impl IntoIterator<Item = f64>) {
        lock(&self.focus_scores).extend(scores);
    }

    /// Delays every focus score response.
    pub fn set_focus_delay(&self, delay: Duration) {
        *lock(&self.focus_delay) = delay;
    }

    pub fn push_warnings(&self, counts: impl IntoIterator<Item = u32>) {
        lock(&self.warnings).extend(counts);
    }

    /// Delays every warning status response.
    pub fn set_warning_delay(&self, delay: Duration) {
        *lock(&self.warning_delay) = delay;
    }

    pub fn set_should_fail_begin(&self, should_fail: bool) {
        self.should_fail_begin.store(should_fail, Ordering::SeqCst);
    }

    pub fn set_should_fail_save(&self, should_fail: bool) {
        self.should_fail_save.store(should_fail, Ordering::SeqCst);
    }

    /// Records passed to `save_session`, including rejected ones.
    #[must_use]
    pub fn saved_records(&self) -> Vec<SessionRecord> {
        lock(&self.saved_records).clone()
    }

    #[must_use]
    pub fn duration_call_count(&self) -> usize {
        self.duration_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn begin_call_count(&self) -> usize {
        self.begin_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn end_call_count(&self) -> usize {
        self.end_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn focus_call_count(&self) -> usize {
        self.focus_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn warning_call_count(&self) -> usize {
        self.warning_calls.load(Ordering::SeqCst)
    }

    /// Highest number of focus requests that were pending at the same time.
    #[must_use]
    pub fn max_focus_in_flight(&self) -> usize {
        self.max_focus_in_flight.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn max_warning_in_flight(&self) -> usize {
        self.max_warning_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockFocusService {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even when the request is cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FocusService for MockFocusService {
    async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        lock(&self.login_response)
            .clone()
            .ok_or(ApiError::Unavailable("/submit"))
    }

    async fn session_duration(
        &self,
        _username: &str,
        _date: NaiveDate,
    ) -> Result<DurationResponse, ApiError> {
        self.duration_calls.fetch_add(1, Ordering::SeqCst);
        let minutes = *lock(&self.duration_minutes);
        minutes
            .map(|minutes| DurationResponse {
                duration: Some(minutes),
            })
            .ok_or(ApiError::Unavailable("/duration"))
    }

    async fn begin_session(&self) -> Result<(), ApiError> {
        self.begin_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail_begin.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable("/start_session"));
        }
        Ok(())
    }

    async fn focus_score(&self) -> Result<f64, ApiError> {
        self.focus_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.focus_in_flight, &self.max_focus_in_flight);

        let delay = *lock(&self.focus_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let next = lock(&self.focus_scores).pop_front();
        next.ok_or(ApiError::Unavailable("/get_focus_score"))
    }

    async fn end_session(&self) -> Result<SessionSummary, ApiError> {
        self.end_calls.fetch_add(1, Ordering::SeqCst);
        let summary = *lock(&self.summary);
        summary.ok_or(ApiError::Unavailable("/stop_session"))
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), ApiError> {
        lock(&self.saved_records).push(record.clone());
        if self.should_fail_save.load(Ordering::SeqCst) {
            return Err(ApiError::Rejected {
                endpoint: "/save-session",
                message: "simulated failure".to_string(),
            });
        }
        Ok(())
    }

    async fn warning_count(&self) -> Result<u32, ApiError> {
        self.warning_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.warning_in_flight, &self.max_warning_in_flight);

        let delay = *lock(&self.warning_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let next = lock(&self.warnings).pop_front();
        let mut last = lock(&self.last_warning);
        if let Some(count) = next {
            *last = count;
        }
        Ok(*last)
    }

    fn video_feed_url(&self) -> String {
        "mock://video_feed".to_string()
    }
}
