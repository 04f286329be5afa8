//! CLI module for the Focus Dashboard.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `user_store`: Remembered username

pub mod commands;
pub mod display;
pub mod user_store;

pub use commands::{Cli, Commands, LoginArgs, RunArgs};
pub use display::Display;
pub use user_store::UserStore;
