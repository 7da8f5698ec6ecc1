//! `qcloud auth` subcommands: login, get, refresh, revoke.

use anyhow::Result;
use qcloud_client::{
    AuthTokenManager, FileTokenStore, HttpOauthApi, LoginMode, LoginOutcome, TokenKind,
};
use qcloud_config::ResolvedConfig;
use secrecy::ExposeSecret;

use crate::args::{AuthCommands, Cli};
use crate::commands::resolve_config;
use crate::flows::RedirectFlow;

fn manager(config: &ResolvedConfig) -> Result<AuthTokenManager<HttpOauthApi, FileTokenStore>> {
    Ok(AuthTokenManager::new(
        HttpOauthApi::from_config(config)?,
        FileTokenStore::user_default()?,
        config.leap_api_endpoint.clone(),
    )?)
}

pub async fn run(cli: &Cli, command: &AuthCommands) -> Result<()> {
    let config = resolve_config(cli)?;
    let mut manager = manager(&config)?;

    match command {
        AuthCommands::Login { oob, skip_valid } => {
            let mode = if *oob {
                LoginMode::OutOfBand
            } else {
                LoginMode::Redirect
            };
            let flow = RedirectFlow::bind().await?;
            match manager.login(&flow, mode, *skip_valid).await? {
                LoginOutcome::Authorized => println!("Authorized against {}", config.leap_api_endpoint),
                LoginOutcome::Skipped => println!("Existing token is still valid; nothing to do"),
            }
        }
        AuthCommands::Get { kind } => {
            let token = manager.get(TokenKind::from(*kind))?;
            println!("{}", token.expose_secret());
        }
        AuthCommands::Refresh => {
            manager.refresh().await?;
            println!("Token refreshed");
        }
        AuthCommands::Revoke { kind } => {
            let kind = TokenKind::from(*kind);
            manager.revoke(kind).await?;
            println!("Revoked the {}", kind.as_hint());
        }
    }
    Ok(())
}
