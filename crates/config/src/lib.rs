//! Configuration resolution for the qcloud client.
//!
//! This crate determines, for any invocation, which endpoint, region, token
//! and transport options apply, by merging explicit arguments, environment
//! variables, on-disk profile files and built-in defaults under a fixed
//! precedence.

pub mod constants;
mod env;
mod error;
mod file;
mod locator;
mod resolver;
mod write;

pub use env::{env_config_file, env_profile, env_var_or_none};
pub use error::ConfigError;
pub use file::{ConfigFile, ProfileSection};
pub use locator::{Scope, candidate_paths, list_paths};
pub use resolver::{ExplicitOptions, ResolvedConfig, resolve};
pub use write::update_profile;

/// Load environment variables from a `.env` file if present.
///
/// Missing `.env` files are silently ignored. Setting `DOTENV_DISABLED=1`
/// skips loading entirely (useful for testing).
pub fn load_dotenv() -> Result<(), ConfigError> {
    if matches!(
        std::env::var("DOTENV_DISABLED").ok().as_deref(),
        Some("true") | Some("1")
    ) {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => Err(ConfigError::DotenvParse { error_index: idx }),
        Err(dotenvy::Error::Io(e)) => Err(ConfigError::Io(e)),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}
