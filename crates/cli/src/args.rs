//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Map global options into `ExplicitOptions` for the resolver.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `commands` module).
//! - Does not resolve configuration precedence (see `qcloud_config`).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use qcloud_config::ExplicitOptions;

#[derive(Parser)]
#[command(name = "qcloud")]
#[command(about = "qcloud - configure and authenticate the quantum cloud client", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  qcloud config ls --include-missing\n  qcloud config inspect --profile eu\n  qcloud config create --auto\n  qcloud regions ls --json\n  qcloud auth login --oob\n  qcloud auth get access-token\n  qcloud leap project ls\n"
)]
pub struct Cli {
    /// Path to a configuration file (overrides the search order)
    #[arg(short = 'f', long, global = true, env = "QCLOUD_CONFIG_FILE", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Profile name to read from the configuration file
    #[arg(short, long, global = true, env = "QCLOUD_PROFILE")]
    pub profile: Option<String>,

    /// Solver API endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// API region code (e.g. na-west-1)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Client type (qpu, hybrid, ...)
    #[arg(long, global = true)]
    pub client: Option<String>,

    /// Solver selection criteria
    #[arg(long, global = true)]
    pub solver: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub request_timeout: Option<String>,

    /// Problem polling timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub polling_timeout: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Global options as the highest-precedence resolution tier.
    ///
    /// `--config-file` and `--profile` are not options; they steer file and
    /// profile selection and are passed to the resolver separately.
    pub fn explicit_options(&self) -> ExplicitOptions {
        ExplicitOptions {
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            client: self.client.clone(),
            solver: self.solver.clone(),
            request_timeout: self.request_timeout.clone(),
            polling_timeout: self.polling_timeout.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and create configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Region metadata
    Regions {
        #[command(subcommand)]
        command: RegionsCommands,
    },
    /// OAuth token lifecycle
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Leap account operations
    Leap {
        #[command(subcommand)]
        command: LeapCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// List configuration file locations in search order
    Ls {
        /// Only system-scope locations
        #[arg(long)]
        system: bool,
        /// Only user-scope locations
        #[arg(long)]
        user: bool,
        /// Only the local (working directory) location
        #[arg(long)]
        local: bool,
        /// Include locations where no file exists
        #[arg(long)]
        include_missing: bool,
    },
    /// Show the fully resolved configuration and where it came from
    Inspect,
    /// Create or update a configuration file profile
    Create {
        /// Fetch the API token from Leap instead of prompting
        #[arg(long)]
        auto: bool,
        /// Where to write; defaults to the user-scope location
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RegionsCommands {
    /// List available API regions
    Ls {
        /// Bypass the on-disk cache
        #[arg(long)]
        refresh: bool,
        /// Emit the raw region records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKindArg {
    /// The short-lived access token
    AccessToken,
    /// The long-lived refresh token
    RefreshToken,
}

impl From<TokenKindArg> for qcloud_client::TokenKind {
    fn from(arg: TokenKindArg) -> Self {
        match arg {
            TokenKindArg::AccessToken => qcloud_client::TokenKind::Access,
            TokenKindArg::RefreshToken => qcloud_client::TokenKind::Refresh,
        }
    }
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Authorize this machine against the Leap API
    Login {
        /// Copy/paste the authorization code instead of a browser redirect
        #[arg(long)]
        oob: bool,
        /// Skip the flow when a valid token is already on record
        #[arg(long)]
        skip_valid: bool,
    },
    /// Print a stored token
    Get {
        #[arg(value_enum)]
        kind: TokenKindArg,
    },
    /// Exchange the refresh token for a new token pair
    Refresh,
    /// Revoke a stored token at the server
    Revoke {
        #[arg(value_enum, default_value = "access-token")]
        kind: TokenKindArg,
    },
}

#[derive(Subcommand)]
pub enum LeapCommands {
    /// Leap project operations
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects visible to the authenticated account
    Ls,
    /// Print the Solver API token for one project
    Token {
        /// Project name or code
        #[arg(long)]
        project: String,
    },
}
