//! Leap API collaborator: project listing and project-scoped token lookup.

use async_trait::async_trait;
use qcloud_config::ResolvedConfig;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, Result};

/// A Leap project visible to the authenticated account.
#[derive(Debug, Clone, Deserialize)]
pub struct LeapProject {
    pub id: u64,
    pub name: String,
    pub code: String,
}

#[async_trait]
pub trait LeapApi: Send + Sync {
    async fn list_projects(&self, access_token: &str) -> Result<Vec<LeapProject>>;

    /// The Solver API token scoped to one project.
    async fn project_token(&self, access_token: &str, project: &LeapProject)
    -> Result<SecretString>;
}

#[derive(Deserialize)]
struct ProjectsResponse {
    projects: Vec<ProjectEnvelope>,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: LeapProject,
}

#[derive(Deserialize)]
struct ProjectTokenResponse {
    token: String,
}

pub struct HttpLeapApi {
    client: reqwest::Client,
    base: Url,
    timeout: std::time::Duration,
}

impl HttpLeapApi {
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let base = Url::parse(&config.leap_api_endpoint)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid leap endpoint: {e}")))?;
        Ok(Self {
            client: super::http_client(config)?,
            base,
            timeout: config.request_timeout,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid leap URL: {e}")))?;
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("malformed leap response: {e}")))
    }
}

#[async_trait]
impl LeapApi for HttpLeapApi {
    async fn list_projects(&self, access_token: &str) -> Result<Vec<LeapProject>> {
        let response: ProjectsResponse =
            self.get_json("leap/projects", access_token).await?;
        Ok(response.projects.into_iter().map(|p| p.project).collect())
    }

    async fn project_token(
        &self,
        access_token: &str,
        project: &LeapProject,
    ) -> Result<SecretString> {
        let path = format!("leap/projects/{}/token", project.code);
        let response: ProjectTokenResponse = self.get_json(&path, access_token).await?;
        Ok(SecretString::new(response.token.into()))
    }
}
