//! `qcloud regions` subcommands.

use anyhow::Result;
use qcloud_client::RegionsService;

use crate::args::{Cli, RegionsCommands};
use crate::commands::resolve_config;

pub async fn run(cli: &Cli, command: &RegionsCommands) -> Result<()> {
    match command {
        RegionsCommands::Ls { refresh, json } => ls(cli, *refresh, *json).await,
    }
}

async fn ls(cli: &Cli, refresh: bool, json: bool) -> Result<()> {
    let config = resolve_config(cli)?;
    let service = RegionsService::from_config(&config)?;
    let regions = service.list_regions(refresh).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&regions)?);
        return Ok(());
    }

    if regions.is_empty() {
        println!("No regions reported by {}", config.metadata_api_endpoint);
        return Ok(());
    }
    for region in &regions {
        let marker = if region.code == config.region { "*" } else { " " };
        println!("{marker} {:<16} {:<24} {}", region.code, region.name, region.endpoint);
    }
    Ok(())
}
