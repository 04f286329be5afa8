//! Focus Dashboard Library
//!
//! This library provides the core functionality for the Focus Dashboard CLI.
//! It includes:
//! - Session lifecycle controller with its countdown, focus poller and warning watcher
//! - Client for the focus-scoring service, plus a scriptable mock
//! - Dashboard view abstraction with terminal and recording implementations
//! - CLI command parsing and display utilities
//! - Type definitions for configuration, focus samples and session records

pub mod api;
pub mod cli;
pub mod session;
pub mod types;
pub mod ui;

// Re-export commonly used types for convenience
pub use api::{ApiError, FocusService, HttpFocusService, MockFocusService};
pub use session::{SessionCommand, SessionController, SessionId, StopReason};
pub use types::{
    DashboardConfig, FocusBand, FocusSample, SessionRecord, SessionState, SessionSummary,
};
pub use ui::{Controls, DashboardView, RecordingDashboard, TerminalDashboard};
