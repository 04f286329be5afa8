//! Display utilities for the Focus Dashboard CLI.
//!
//! This module provides formatted output for:
//! - Login results
//! - Error messages and their suggestions

use crate::api::ApiError;
use crate::types::LoginResponse;

/// Shown when the login request never got an answer.
pub const CONNECTION_FAILED: &str = "Failed to connect to the server.";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a successful login.
    pub fn show_login_success(username: &str, response: &LoginResponse) {
        println!("* Logged in as {}", username);
        if !response.message.is_empty() {
            println!("  {}", response.message);
        }
    }

    /// Shows the message of a rejected login.
    pub fn show_login_rejected(response: &LoginResponse) {
        eprintln!("{}", Self::rejection_message(response));
    }

    /// Shows a failed login request with a hint for fixing it.
    pub fn show_connection_error(error: &ApiError) {
        eprintln!("{}", CONNECTION_FAILED);
        tracing::debug!("login failed: {}", error);
        eprintln!("  {}", Self::connection_hint(error));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// The suggestion alone for transport failures; otherwise the error
    /// itself comes first.
    fn connection_hint(error: &ApiError) -> String {
        if error.is_connection() {
            error.suggestion().to_string()
        } else {
            format!("{} ({})", error, error.suggestion())
        }
    }

    fn rejection_message(response: &LoginResponse) -> String {
        if response.message.is_empty() {
            "Login failed.".to_string()
        } else {
            response.message.clone()
        }
    }
}
