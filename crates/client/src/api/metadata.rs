//! Metadata API collaborator: region discovery.

use async_trait::async_trait;
use qcloud_config::ResolvedConfig;
use url::Url;

use crate::error::{ClientError, Result};
use crate::regions::Region;

/// The metadata service, specified at its interface boundary.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// List available API regions. An empty list is a valid result.
    async fn list_regions(&self) -> Result<Vec<Region>>;

    /// The endpoint this collaborator talks to, for error reporting.
    fn endpoint(&self) -> &str;
}

/// reqwest-backed metadata client built from a resolved configuration.
pub struct HttpMetadataApi {
    client: reqwest::Client,
    base: Url,
    timeout: std::time::Duration,
}

impl HttpMetadataApi {
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let base = Url::parse(&config.metadata_api_endpoint)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid metadata endpoint: {e}")))?;
        Ok(Self {
            client: super::http_client(config)?,
            base,
            timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl MetadataApi for HttpMetadataApi {
    async fn list_regions(&self) -> Result<Vec<Region>> {
        let url = self
            .base
            .join("regions")
            .map_err(|e| ClientError::InvalidResponse(format!("invalid regions URL: {e}")))?;

        tracing::debug!(%url, "fetching available regions");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        response
            .json::<Vec<Region>>()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("malformed region list: {e}")))
    }

    fn endpoint(&self) -> &str {
        self.base.as_str()
    }
}
