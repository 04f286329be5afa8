//! Command definitions for the Focus Dashboard CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Focus Dashboard - timed focus sessions against a focus-scoring service
#[derive(Parser, Debug)]
#[command(
    name = "focus-dashboard",
    version,
    about = "Terminal dashboard for focus-monitored work sessions",
    long_about = "Runs timed focus sessions against a focus-scoring service.\n\
                  Shows the remaining time, the live focus status and warnings,\n\
                  and saves the session results when it ends.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the dashboard (commands on stdin: start, stop, reset, quit)
    Run(RunArgs),

    /// Log in to the focus-scoring service and remember the username
    Login(LoginArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Base URL of the focus-scoring service
    #[arg(short, long, value_parser = validate_server_url)]
    pub server: Option<String>,

    /// Username for duration lookups and saved sessions
    #[arg(short, long, value_parser = validate_username)]
    pub username: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start a session as soon as the dashboard is up
    #[arg(short, long)]
    pub auto_start: bool,
}

/// Arguments for the login command
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(short, long, value_parser = validate_username)]
    pub username: String,

    #[arg(short, long)]
    pub password: String,

    /// Base URL of the focus-scoring service
    #[arg(short, long, value_parser = validate_server_url)]
    pub server: Option<String>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the username.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_username(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("username must not be empty".to_string());
    }
    if trimmed.chars().count() > 100 {
        return Err("username must be at most 100 characters".to_string());
    }
    Ok(trimmed.to_string())
}

/// Accepts only http(s) URLs.
fn validate_server_url(s: &str) -> Result<String, String> {
    let url = reqwest::Url::parse(s).map_err(|e| format!("invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => Ok(s.to_string()),
        other => Err(format!("unsupported scheme '{}' (use http or https)", other)),
    }
}

// ============================================================================
// Tests
// ============================================================================
