//! Merging of configuration sources into an immutable resolved value.
//!
//! Responsibilities:
//! - Select the config file (explicit path, environment, or highest-precedence
//!   existing locator candidate).
//! - Select the profile (explicit, environment-designated, or first in file).
//! - Merge every recognized option under a fixed precedence: explicit
//!   argument, environment variable, profile section, defaults section,
//!   built-in constant.
//!
//! Does NOT handle:
//! - Writing or updating config files (see write.rs).
//! - Anything network-facing; resolution is a pure read.
//!
//! Invariants:
//! - Every `ResolvedConfig` field has a value after resolution; only
//!   endpoints and the region carry built-ins, the rest default to
//!   none/false/defaults so downstream code never branches on "unset".
//! - An explicitly named profile must exist even if its section is empty.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::constants::{
    DEFAULT_LEAP_API_ENDPOINT, DEFAULT_METADATA_API_ENDPOINT, DEFAULT_REGION,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_SOLVER_API_ENDPOINT,
};
use crate::env::{env_config_file, env_option, env_profile};
use crate::error::ConfigError;
use crate::file::ConfigFile;
use crate::locator::list_paths;

/// Explicit call-time option values, the highest precedence tier.
///
/// All values are raw strings; typed conversion happens once, at the end of
/// resolution, through the same parsing path as environment and file values.
#[derive(Debug, Clone, Default)]
pub struct ExplicitOptions {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub metadata_api_endpoint: Option<String>,
    pub leap_api_endpoint: Option<String>,
    pub token: Option<String>,
    pub client: Option<String>,
    pub solver: Option<String>,
    pub headers: Option<String>,
    pub cert: Option<String>,
    pub proxy: Option<String>,
    pub permissive_ssl: Option<String>,
    pub request_retry: Option<String>,
    pub request_timeout: Option<String>,
    pub polling_timeout: Option<String>,
}

impl ExplicitOptions {
    fn get(&self, option: &str) -> Option<&String> {
        match option {
            "endpoint" => self.endpoint.as_ref(),
            "region" => self.region.as_ref(),
            "metadata_api_endpoint" => self.metadata_api_endpoint.as_ref(),
            "leap_api_endpoint" => self.leap_api_endpoint.as_ref(),
            "token" => self.token.as_ref(),
            "client" => self.client.as_ref(),
            "solver" => self.solver.as_ref(),
            "headers" => self.headers.as_ref(),
            "cert" => self.cert.as_ref(),
            "proxy" => self.proxy.as_ref(),
            "permissive_ssl" => self.permissive_ssl.as_ref(),
            "request_retry" => self.request_retry.as_ref(),
            "request_timeout" => self.request_timeout.as_ref(),
            "polling_timeout" => self.polling_timeout.as_ref(),
            _ => None,
        }
    }
}

/// The immutable result of configuration resolution.
///
/// Created once per invocation, owned by the caller, threaded explicitly
/// through every dependent operation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub region: String,
    pub metadata_api_endpoint: String,
    pub leap_api_endpoint: String,
    pub token: Option<SecretString>,
    pub client_type: Option<String>,
    pub solver_selector: Option<String>,
    pub headers: Option<String>,
    pub cert: Option<PathBuf>,
    pub proxy: Option<String>,
    pub permissive_ssl: bool,
    pub request_retry: Option<String>,
    pub request_timeout: Duration,
    pub polling_timeout: Option<Duration>,
}

/// Resolve the configuration for one invocation.
///
/// Pure read: no side effects on the filesystem or environment. Fails only
/// if an explicitly named file or profile does not exist, or a source value
/// cannot be converted to its option's type.
pub fn resolve(
    explicit: &ExplicitOptions,
    profile: Option<&str>,
    config_file: Option<&Path>,
) -> Result<ResolvedConfig, ConfigError> {
    let file = select_file(config_file)?;
    let section = select_profile(&file, profile)?;

    tracing::debug!(
        path = %file.path.display(),
        profile = section.as_deref().unwrap_or("<defaults>"),
        "resolving configuration"
    );

    let lookup = |option: &str| -> Option<String> {
        if let Some(value) = explicit.get(option).filter(|v| !v.trim().is_empty()) {
            return Some(value.trim().to_string());
        }
        if let Some(value) = env_option(option) {
            return Some(value);
        }
        if let Some(name) = &section {
            if let Some(value) = file
                .profile(name)
                .and_then(|p| p.options.get(option))
                .filter(|v| !v.is_empty())
            {
                return Some(value.clone());
            }
        }
        file.defaults.get(option).filter(|v| !v.is_empty()).cloned()
    };

    Ok(ResolvedConfig {
        endpoint: lookup("endpoint")
            .map(|v| validate_endpoint("endpoint", &v))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_SOLVER_API_ENDPOINT.to_string()),
        region: lookup("region").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        metadata_api_endpoint: lookup("metadata_api_endpoint")
            .map(|v| validate_endpoint("metadata_api_endpoint", &v))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_METADATA_API_ENDPOINT.to_string()),
        leap_api_endpoint: lookup("leap_api_endpoint")
            .map(|v| validate_endpoint("leap_api_endpoint", &v))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_LEAP_API_ENDPOINT.to_string()),
        token: lookup("token").map(|t| SecretString::new(t.into())),
        client_type: lookup("client"),
        solver_selector: lookup("solver"),
        headers: lookup("headers"),
        cert: lookup("cert").map(PathBuf::from),
        proxy: lookup("proxy"),
        permissive_ssl: lookup("permissive_ssl")
            .map(|v| parse_bool("permissive_ssl", &v))
            .transpose()?
            .unwrap_or(false),
        request_retry: lookup("request_retry"),
        request_timeout: lookup("request_timeout")
            .map(|v| parse_secs("request_timeout", &v))
            .transpose()?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        polling_timeout: lookup("polling_timeout")
            .map(|v| parse_secs("polling_timeout", &v))
            .transpose()?,
    })
}

/// Config file selection: explicit path must exist; the environment may name
/// one; otherwise the highest-precedence existing candidate wins, and with
/// no file at all resolution proceeds from defaults/env/args alone.
fn select_file(config_file: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = config_file {
        return ConfigFile::load(path);
    }
    if let Some(path) = env_config_file() {
        return ConfigFile::load(PathBuf::from(path));
    }
    match list_paths(&[], false).pop() {
        Some(path) => ConfigFile::load(path),
        None => Ok(ConfigFile::empty("")),
    }
}

fn select_profile(file: &ConfigFile, profile: Option<&str>) -> Result<Option<String>, ConfigError> {
    let named = profile.map(str::to_string).or_else(env_profile);
    match named {
        Some(name) => {
            if file.profile(&name).is_none() {
                return Err(ConfigError::ProfileNotFound {
                    name,
                    path: file.path.clone(),
                });
            }
            Ok(Some(name))
        }
        None => Ok(file.first_profile().map(|p| p.name.clone())),
    }
}

fn validate_endpoint(var: &str, raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        var: var.to_string(),
        message: format!("must be an absolute http(s) URL: {e}"),
    })?;
    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("scheme must be http or https, got: {scheme}"),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: "host is required".to_string(),
        });
    }
    // Trailing slash is significant for URL joining downstream.
    let mut normalized = parsed.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: "must be a boolean".to_string(),
        }),
    }
}

fn parse_secs(var: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        message: "must be a number of seconds".to_string(),
    })?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: "must be greater than 0 seconds".to_string(),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}
