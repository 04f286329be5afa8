//! Session orchestration for the Focus Dashboard.
//!
//! This module contains the client-side session state machine:
//! - `clock`: Repeating tick source
//! - `timer`: Countdown of the remaining session seconds
//! - `poller`: Focus score polling and classification
//! - `watcher`: Warning count polling and forced termination
//! - `controller`: Lifecycle state machine that owns the three components
//!
//! Components run as tokio tasks and report back to the controller over a
//! single event channel. Each event carries the [`SessionId`] of the session
//! that produced it, so anything arriving after that session ended is dropped.

pub mod clock;
pub mod controller;
pub mod poller;
pub mod timer;
pub mod watcher;

pub use controller::SessionController;
pub use poller::FocusPoller;
pub use timer::TimerEngine;
pub use watcher::WarningWatcher;

use crate::types::FocusSample;

// ============================================================================
// SessionId
// ============================================================================

/// Identifies one Idle→Active→Idle cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionId(u64);

impl SessionId {
    /// Returns the id of the session after this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// SessionEvent
// ============================================================================

/// Something a running component reports to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEventKind {
    /// One second elapsed
    Tick {
        /// Remaining seconds after this tick
        remaining_seconds: u32,
    },
    /// Countdown reached zero
    Expired,
    /// A focus score arrived
    FocusSampled(FocusSample),
    /// The warning count went up
    WarningRaised {
        /// New warning count
        count: u32,
    },
    /// The warning count reached the threshold while Active
    ForceStop {
        /// Warning count that triggered the stop
        count: u32,
    },
}

/// Event tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub kind: SessionEventKind,
}

impl SessionEvent {
    pub fn new(session: SessionId, kind: SessionEventKind) -> Self {
        Self { session, kind }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// User actions delivered to the controller's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    Reset,
    /// Stop any running session and leave the event loop
    Quit,
}

impl std::str::FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => Ok(SessionCommand::Start),
            "stop" | "x" => Ok(SessionCommand::Stop),
            "reset" | "r" => Ok(SessionCommand::Reset),
            "quit" | "q" | "exit" => Ok(SessionCommand::Quit),
            other => Err(format!("unknown command '{}' (start, stop, reset, quit)", other)),
        }
    }
}

/// Why a session left the Active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user pressed stop (or reset/quit while active)
    UserRequested,
    /// The countdown reached zero
    Expired,
    /// The warning watcher hit the threshold
    Forced,
}

impl StopReason {
    /// Only a countdown that ran out counts as auto-ended; a forced stop
    /// behaves exactly like the user pressing stop.
    pub fn is_auto_ended(&self) -> bool {
        matches!(self, StopReason::Expired)
    }
}
