//! Error types for configuration loading.
//!
//! Invariants:
//! - All variants carry the resource identifier (path, profile, variable)
//!   that failed, so the CLI boundary can render a precise message.
//! - A missing config file is distinguished from a malformed one: the former
//!   is recoverable by falling back, the latter is always surfaced.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly named config file does not exist.
    #[error("Config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but is not valid section/key-value text.
    #[error("Failed to parse {} (line {line}): {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// An explicitly named profile does not exist in the selected file.
    #[error("Profile '{name}' not found in {}", path.display())]
    ProfileNotFound { name: String, path: PathBuf },

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Unable to determine config directory: {0}")]
    ConfigDirUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the `.env` file.
    ///
    /// Only the byte index is reported, never the offending line content.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
