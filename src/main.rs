//! Bullet Train settings - Application entry point
//!
//! CLI-based entry point that dispatches to the settings commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bullet_train_settings::{
    cli::{Cli, Commands},
    commands,
    config::EnvVars,
};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    // Snapshot the environment once, after loading .env
    let env = EnvVars::from_process();
    let mut stdout = std::io::stdout().lock();

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args, &env, &mut stdout),
        Commands::Show(args) => commands::show::execute(args, &env, &mut stdout),
    };

    // Handle errors
    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
