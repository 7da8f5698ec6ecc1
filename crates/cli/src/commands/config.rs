//! `qcloud config` subcommands: ls, inspect, create.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use qcloud_client::{AuthTokenManager, FileTokenStore, HttpLeapApi, HttpOauthApi, LeapApi};
use qcloud_config::{ConfigError, Scope, candidate_paths, list_paths, update_profile};
use secrecy::ExposeSecret;

use crate::args::{Cli, ConfigCommands};
use crate::commands::resolve_config;

pub async fn run(cli: &Cli, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Ls {
            system,
            user,
            local,
            include_missing,
        } => ls(*system, *user, *local, *include_missing),
        ConfigCommands::Inspect => inspect(cli),
        ConfigCommands::Create { auto, file } => create(cli, *auto, file.clone()).await,
    }
}

fn ls(system: bool, user: bool, local: bool, include_missing: bool) -> Result<()> {
    let mut scopes = Vec::new();
    if system {
        scopes.push(Scope::System);
    }
    if user {
        scopes.push(Scope::User);
    }
    if local {
        scopes.push(Scope::Local);
    }

    for path in list_paths(&scopes, include_missing) {
        println!("{}", path.display());
    }
    Ok(())
}

fn inspect(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    println!("endpoint = {}", config.endpoint);
    println!("region = {}", config.region);
    println!("metadata_api_endpoint = {}", config.metadata_api_endpoint);
    println!("leap_api_endpoint = {}", config.leap_api_endpoint);
    println!(
        "token = {}",
        if config.token.is_some() { "***" } else { "(not set)" }
    );
    if let Some(client) = &config.client_type {
        println!("client = {client}");
    }
    if let Some(solver) = &config.solver_selector {
        println!("solver = {solver}");
    }
    if let Some(proxy) = &config.proxy {
        println!("proxy = {proxy}");
    }
    if let Some(cert) = &config.cert {
        println!("cert = {}", cert.display());
    }
    println!("permissive_ssl = {}", config.permissive_ssl);
    println!("request_timeout = {}s", config.request_timeout.as_secs_f64());
    if let Some(polling) = config.polling_timeout {
        println!("polling_timeout = {}s", polling.as_secs_f64());
    }
    Ok(())
}

async fn create(cli: &Cli, auto: bool, file: Option<PathBuf>) -> Result<()> {
    let path = match file.or_else(|| cli.config_file.clone()) {
        Some(path) => path,
        None => user_scope_path()?,
    };
    let profile = cli.profile.as_deref().unwrap_or("defaults");

    let token = if auto {
        // The named profile may be the one being created; resolve without it
        // so endpoint defaults still apply.
        let config = qcloud_config::resolve(&cli.explicit_options(), None, None)?;
        fetch_token_from_leap(&config).await?
    } else {
        prompt("Solver API token: ")?
    };
    if token.is_empty() {
        bail!("no token provided; nothing to write");
    }

    let mut options = vec![("token".to_string(), token)];
    if let Some(region) = &cli.region {
        options.push(("region".to_string(), region.clone()));
    }
    if let Some(endpoint) = &cli.endpoint {
        options.push(("endpoint".to_string(), endpoint.clone()));
    }

    update_profile(&path, profile, &options)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// The user-scope candidate is where new config lands by default.
fn user_scope_path() -> Result<PathBuf> {
    candidate_paths()
        .into_iter()
        .find(|(scope, _)| *scope == Scope::User)
        .map(|(_, path)| path)
        .ok_or_else(|| {
            ConfigError::ConfigDirUnavailable("user configuration directory".into()).into()
        })
}

/// The `--auto` flow: use the OAuth session to pick a Leap project and pull
/// its Solver API token.
async fn fetch_token_from_leap(config: &qcloud_config::ResolvedConfig) -> Result<String> {
    let mut manager = AuthTokenManager::new(
        HttpOauthApi::from_config(config)?,
        FileTokenStore::user_default()?,
        config.leap_api_endpoint.clone(),
    )?;
    let access_token = manager
        .active_access_token()
        .await
        .context("an active Leap session is required for --auto; run `qcloud auth login`")?;

    let leap = HttpLeapApi::from_config(config)?;
    let projects = leap.list_projects(access_token.expose_secret()).await?;

    let project = match projects.as_slice() {
        [] => bail!("the authenticated account has no Leap projects"),
        [only] => only,
        many => {
            println!("Available projects:");
            for (i, p) in many.iter().enumerate() {
                println!("  {}) {} ({})", i + 1, p.name, p.code);
            }
            let choice = prompt("Project number: ")?;
            let index: usize = choice
                .parse()
                .ok()
                .filter(|n| (1..=many.len()).contains(n))
                .context("invalid project selection")?;
            &many[index - 1]
        }
    };

    let token = leap
        .project_token(access_token.expose_secret(), project)
        .await?;
    println!("Using project {} ({})", project.name, project.code);
    Ok(token.expose_secret().to_string())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
