//! Region metadata with a disk-backed cache in front of the Metadata API.

use std::time::Duration;

use qcloud_config::ResolvedConfig;
use qcloud_config::constants::DEFAULT_REGIONS_CACHE_MAXAGE;
use serde::{Deserialize, Serialize};

use crate::api::metadata::{HttpMetadataApi, MetadataApi};
use crate::cache::{DiskCache, Fingerprint};
use crate::error::{ClientError, Result};

/// One region as reported by the Metadata API. Unknown fields ride along
/// so a cache written by a newer release stays readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub endpoint: String,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Region {
    /// Solver API endpoint for this region.
    pub fn solver_api_endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Cached view over the Metadata API region listing.
pub struct RegionsService<A: MetadataApi> {
    api: A,
    cache: DiskCache,
    maxage: Duration,
    fingerprint: Fingerprint,
}

impl RegionsService<HttpMetadataApi> {
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let cache = DiskCache::user_cache_dir("api")
            .ok_or_else(|| ClientError::Cache("cache directory unavailable".into()))?;
        Ok(Self::new(
            HttpMetadataApi::from_config(config)?,
            cache,
            DEFAULT_REGIONS_CACHE_MAXAGE,
            request_fingerprint(config),
        ))
    }
}

impl<A: MetadataApi> RegionsService<A> {
    pub fn new(api: A, cache: DiskCache, maxage: Duration, fingerprint: Fingerprint) -> Self {
        Self {
            api,
            cache,
            maxage,
            fingerprint,
        }
    }

    /// List known regions, serving from cache when a fresh entry exists.
    ///
    /// Timeouts propagate as-is so callers can distinguish a slow endpoint
    /// from an unreachable one; every other fetch failure collapses into
    /// `RegionsUnavailable`.
    pub async fn list_regions(&self, force_refresh: bool) -> Result<Vec<Region>> {
        let endpoint = self.api.endpoint().to_owned();
        let result = self
            .cache
            .memoize(&self.fingerprint, self.maxage, force_refresh, || async {
                tracing::debug!(%endpoint, "fetching region metadata");
                self.api.list_regions().await
            })
            .await;

        match result {
            Ok(regions) => Ok(regions),
            Err(err @ ClientError::Timeout { .. }) => Err(err),
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "region fetch failed");
                Err(ClientError::RegionsUnavailable { endpoint })
            }
        }
    }

    /// Look up one region by code.
    pub async fn get_region(&self, code: &str) -> Result<Region> {
        self.list_regions(false)
            .await?
            .into_iter()
            .find(|r| r.code == code)
            .ok_or_else(|| ClientError::NotFound(format!("region {code}")))
    }
}

/// Cache identity for a region listing: every resolved option that can
/// change the bytes the Metadata API returns takes part in the key.
pub fn request_fingerprint(config: &ResolvedConfig) -> Fingerprint {
    Fingerprint::new("regions")
        .part("metadata_api_endpoint", &config.metadata_api_endpoint)
        .part(
            "cert",
            &config
                .cert
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
        .part("headers", config.headers.as_deref().unwrap_or(""))
        .part("proxy", config.proxy.as_deref().unwrap_or(""))
        .part("permissive_ssl", &config.permissive_ssl.to_string())
        .part("request_retry", config.request_retry.as_deref().unwrap_or(""))
        .part(
            "request_timeout",
            &config.request_timeout.as_secs_f64().to_string(),
        )
}
