//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `check` - Resolve settings and report advisories
//! - `show` - Print resolved settings as JSON

pub mod args;

pub use args::{Cli, Commands};
