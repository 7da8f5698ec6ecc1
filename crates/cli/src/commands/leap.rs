//! `qcloud leap` subcommands: project listing and project tokens.

use anyhow::{Context, Result, bail};
use qcloud_client::{
    AuthTokenManager, FileTokenStore, HttpLeapApi, HttpOauthApi, LeapApi, LeapProject,
};
use secrecy::{ExposeSecret, SecretString};

use crate::args::{Cli, LeapCommands, ProjectCommands};
use crate::commands::resolve_config;

pub async fn run(cli: &Cli, command: &LeapCommands) -> Result<()> {
    let LeapCommands::Project { command } = command;
    let config = resolve_config(cli)?;

    let mut manager = AuthTokenManager::new(
        HttpOauthApi::from_config(&config)?,
        FileTokenStore::user_default()?,
        config.leap_api_endpoint.clone(),
    )?;
    let access_token: SecretString = manager
        .active_access_token()
        .await
        .context("an active Leap session is required; run `qcloud auth login`")?;
    let leap = HttpLeapApi::from_config(&config)?;

    match command {
        ProjectCommands::Ls => {
            let projects = leap.list_projects(access_token.expose_secret()).await?;
            if projects.is_empty() {
                println!("No projects visible to this account");
                return Ok(());
            }
            for project in &projects {
                println!("{:<12} {}", project.code, project.name);
            }
        }
        ProjectCommands::Token { project } => {
            let projects = leap.list_projects(access_token.expose_secret()).await?;
            let Some(selected) = find_project(&projects, project) else {
                bail!("no project named {project:?}");
            };
            let token = leap
                .project_token(access_token.expose_secret(), selected)
                .await?;
            println!("{}", token.expose_secret());
        }
    }
    Ok(())
}

/// Match a project by name or code, case-insensitively.
fn find_project<'a>(projects: &'a [LeapProject], wanted: &str) -> Option<&'a LeapProject> {
    projects
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted) || p.code.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projects() -> Vec<LeapProject> {
        vec![
            LeapProject {
                id: 1,
                name: "Alpha".into(),
                code: "A".into(),
            },
            LeapProject {
                id: 2,
                name: "Beta".into(),
                code: "B".into(),
            },
        ]
    }

    #[test]
    fn project_lookup_ignores_case() {
        let projects = projects();
        assert_eq!(find_project(&projects, "b").unwrap().id, 2);
        assert_eq!(find_project(&projects, "alpha").unwrap().id, 1);
        assert_eq!(find_project(&projects, "BETA").unwrap().id, 2);
    }

    #[test]
    fn unknown_project_is_none() {
        assert!(find_project(&projects(), "gamma").is_none());
    }
}
