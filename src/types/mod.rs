//! Core data types for the Focus Dashboard.
//!
//! This module defines the data structures used for:
//! - Session state management
//! - Dashboard configuration with validation
//! - Focus samples and their status classification
//! - Wire types exchanged with the focus-scoring service

use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle state of the focus session, owned by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session
    #[default]
    Idle,
    /// Timer and pollers running
    Active,
    /// Stop sequence in flight, controls locked
    Finalizing,
}

impl SessionState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Active => "active",
            SessionState::Finalizing => "finalizing",
        }
    }

    /// Returns true while a session is running.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

// ============================================================================
// DashboardConfig
// ============================================================================

/// Default base URL of the focus-scoring service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Username used when nobody has logged in.
pub const FALLBACK_USERNAME: &str = "default_user";

/// Session length used when the remote duration lookup fails.
pub const DEFAULT_DURATION_MINUTES: u32 = 25;

/// Configuration for the dashboard and its session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the focus-scoring service
    pub base_url: String,
    /// Logged-in username (if any)
    pub username: Option<String>,
    /// Fallback session length in minutes (1-600)
    pub default_duration_minutes: u32,
    /// Time the terminal label stays visible after a stop
    pub dwell_millis: u64,
    /// Focus score polling period
    pub focus_poll_millis: u64,
    /// Warning count polling period
    pub warning_poll_millis: u64,
    /// Warning count that forces a stop
    pub warning_threshold: u32,
    /// Per-request timeout for remote calls
    pub request_timeout_secs: u64,
    /// Session number submitted with the record
    pub session_number: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            dwell_millis: 1500,
            focus_poll_millis: 1000,
            warning_poll_millis: 2000,
            warning_threshold: 2,
            request_timeout_secs: 5,
            session_number: 1,
        }
    }
}

impl DashboardConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Sets the service base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the username.
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Username sent to the service, falling back to [`FALLBACK_USERNAME`].
    pub fn effective_username(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_USERNAME)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_millis)
    }

    pub fn focus_poll_period(&self) -> Duration {
        Duration::from_millis(self.focus_poll_millis)
    }

    pub fn warning_poll_period(&self) -> Duration {
        Duration::from_millis(self.warning_poll_millis)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Fallback session length in seconds.
    pub fn default_duration(&self) -> NonZeroU32 {
        NonZeroU32::new(self.default_duration_minutes.saturating_mul(60))
            .unwrap_or(NonZeroU32::MIN)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base URL must not be empty".to_string());
        }
        if self.default_duration_minutes < 1 || self.default_duration_minutes > 600 {
            return Err("default duration must be between 1 and 600 minutes".to_string());
        }
        if self.focus_poll_millis < 100 || self.warning_poll_millis < 100 {
            return Err("polling periods must be at least 100ms".to_string());
        }
        if self.warning_threshold < 1 {
            return Err("warning threshold must be at least 1".to_string());
        }
        if self.request_timeout_secs < 1 {
            return Err("request timeout must be at least 1 second".to_string());
        }
        Ok(())
    }
}

/// Resolves the countdown length from a remote duration lookup.
///
/// Any failure, a missing value, or a non-positive duration falls back to
/// `fallback`. Fractional minutes are rounded to the nearest second.
pub fn resolve_session_seconds<E>(
    lookup: Result<DurationResponse, E>,
    fallback: NonZeroU32,
) -> NonZeroU32 {
    let minutes = match lookup {
        Ok(DurationResponse {
            duration: Some(minutes),
        }) if minutes.is_finite() && minutes > 0.0 => minutes,
        _ => return fallback,
    };

    let seconds = (minutes * 60.0).round().clamp(1.0, f64::from(u32::MAX));
    NonZeroU32::new(seconds as u32).unwrap_or(fallback)
}

// ============================================================================
// Focus classification
// ============================================================================

/// Scores above this are "Focused".
pub const FOCUSED_THRESHOLD: f64 = 0.70;

/// Scores above this (and not focused) are "Partially Focused".
pub const PARTIAL_THRESHOLD: f64 = 0.30;

/// Status band derived from a focus score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusBand {
    Focused,
    PartiallyFocused,
    NotFocused,
}

impl FocusBand {
    /// Classifies a score in [0, 1].
    pub fn classify(score: f64) -> Self {
        if score > FOCUSED_THRESHOLD {
            FocusBand::Focused
        } else if score > PARTIAL_THRESHOLD {
            FocusBand::PartiallyFocused
        } else {
            FocusBand::NotFocused
        }
    }

    /// Human readable status label.
    pub fn label(&self) -> &'static str {
        match self {
            FocusBand::Focused => "Status: Focused",
            FocusBand::PartiallyFocused => "Status: Partially Focused",
            FocusBand::NotFocused => "Status: Not Focused",
        }
    }

    /// Classification class attached to the status label.
    pub fn css_class(&self) -> &'static str {
        match self {
            FocusBand::Focused => "status-focused",
            FocusBand::PartiallyFocused => "status-partial",
            FocusBand::NotFocused => "status-not-focused",
        }
    }
}

/// Latest focus score observed by the focus poller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusSample {
    /// Score in [0, 1]
    pub score: f64,
    /// When the response arrived
    pub observed_at: DateTime<Utc>,
}

impl FocusSample {
    /// Builds a sample from a raw score. Non-finite scores are rejected,
    /// finite ones are clamped into [0, 1].
    pub fn from_score(score: f64, observed_at: DateTime<Utc>) -> Option<Self> {
        if !score.is_finite() {
            return None;
        }
        Some(Self {
            score: score.clamp(0.0, 1.0),
            observed_at,
        })
    }

    pub fn band(&self) -> FocusBand {
        FocusBand::classify(self.score)
    }

    /// Score as shown on the dashboard, e.g. `Focus Score: 80.0%`.
    pub fn score_text(&self) -> String {
        format!("Focus Score: {:.1}%", self.score * 100.0)
    }
}

// ============================================================================
// SessionRecord
// ============================================================================

/// Aggregate metrics returned by the service when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub average_focus_score: Option<f64>,
    #[serde(default)]
    pub focus_percentage: Option<f64>,
}

/// Result of one session, submitted once for persistence.
///
/// Metrics are `None` (serialized as `null`) when the end-session call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub username: String,
    pub session_number: u32,
    /// Whole minutes actually elapsed
    #[serde(rename = "duration_completed")]
    pub duration_completed_minutes: u64,
    pub date: NaiveDate,
    #[serde(rename = "focus_score")]
    pub average_focus_score: Option<f64>,
    pub focus_percentage: Option<f64>,
}

impl SessionRecord {
    /// Assembles a record from the elapsed time and whatever summary was obtained.
    pub fn assemble(
        username: impl Into<String>,
        session_number: u32,
        elapsed: Duration,
        date: NaiveDate,
        summary: Option<SessionSummary>,
    ) -> Self {
        let summary = summary.unwrap_or_default();
        Self {
            username: username.into(),
            session_number,
            duration_completed_minutes: elapsed.as_secs() / 60,
            date,
            average_focus_score: summary.average_focus_score,
            focus_percentage: summary.focus_percentage,
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of `POST /submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Response of `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// "success" or "error"
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl LoginResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Body of `POST /duration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationRequest {
    pub username: String,
    pub date: NaiveDate,
}

/// Response of `POST /duration`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationResponse {
    /// Session length in minutes
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Response of `GET /get_focus_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusScoreResponse {
    pub focus_score: f64,
}

/// Response of `GET /warning_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningStatusResponse {
    pub warnings: u32,
}

/// Acknowledgement of `POST /save-session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SaveResponse {
    /// True when the service reported a business failure.
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

// ============================================================================
// Tests
// ============================================================================
