//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Bullet Train settings - resolve and inspect environment configuration
#[derive(Parser, Debug)]
#[command(name = "bullet-train-settings")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve settings and report advisories
    Check(CheckArgs),

    /// Print resolved settings as JSON
    Show(ShowArgs),
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Skip the instance metadata lookup
    #[arg(long, env = "SETTINGS_NO_PROBE")]
    pub no_probe: bool,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Skip the instance metadata lookup
    #[arg(long, env = "SETTINGS_NO_PROBE")]
    pub no_probe: bool,

    /// Print on a single line
    #[arg(long)]
    pub compact: bool,
}
