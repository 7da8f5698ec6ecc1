//! Command handlers. Each handler takes the parsed CLI and returns an
//! `anyhow::Result`; typed errors surface through it for exit-code mapping.

pub mod auth;
pub mod config;
pub mod leap;
pub mod regions;

use anyhow::Result;
use qcloud_config::ResolvedConfig;

use crate::args::Cli;

/// Run resolution with the invocation's global options.
pub fn resolve_config(cli: &Cli) -> Result<ResolvedConfig> {
    let resolved = qcloud_config::resolve(
        &cli.explicit_options(),
        cli.profile.as_deref(),
        cli.config_file.as_deref(),
    )?;
    tracing::debug!(
        endpoint = %resolved.endpoint,
        region = %resolved.region,
        "configuration resolved"
    );
    Ok(resolved)
}
