//! qcloud - configure and authenticate the quantum cloud client.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Drive configuration resolution, region listing and the OAuth token
//!   lifecycle via the shared crates.
//! - Map typed errors to structured exit codes.
//!
//! Does NOT handle:
//! - Resolution precedence or HTTP mechanics (see `crates/config`,
//!   `crates/client`).
//!
//! Invariants:
//! - `load_dotenv()` runs BEFORE CLI parsing so `.env` can provide clap env
//!   defaults.

mod args;
mod commands;
mod error;
mod flows;

use args::{Cli, Commands};
use clap::Parser;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    if let Err(e) = qcloud_config::load_dotenv() {
        eprintln!("Failed to load environment: {e}");
        std::process::exit(ExitCode::ConfigError.as_i32());
    }

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Config { command } => commands::config::run(&cli, command).await,
        Commands::Regions { command } => commands::regions::run(&cli, command).await,
        Commands::Auth { command } => commands::auth::run(&cli, command).await,
        Commands::Leap { command } => commands::leap::run(&cli, command).await,
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::Success.as_i32()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(e.exit_code().as_i32());
        }
    }
}
