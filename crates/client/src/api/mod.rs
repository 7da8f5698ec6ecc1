//! HTTP collaborators for the metadata, OAuth and Leap account APIs.
//!
//! Each remote surface is a trait so the config/credential core can be
//! exercised without a network; the `Http*` implementations are built from a
//! `ResolvedConfig` and honor its transport options (timeout, proxy,
//! permissive SSL, custom headers, CA cert).

pub mod leap;
pub mod metadata;
pub mod oauth;

use qcloud_config::ResolvedConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{ClientError, Result};

pub(crate) const USER_AGENT: &str = concat!("qcloud/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client from the resolved transport options.
pub(crate) fn http_client(config: &ResolvedConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout);

    if config.permissive_ssl {
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    if let Some(cert) = &config.cert {
        let pem = std::fs::read(cert)
            .map_err(|e| ClientError::InvalidResponse(format!("cannot read cert {}: {e}", cert.display())))?;
        builder = builder.add_root_certificate(
            reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ClientError::InvalidResponse(format!("invalid cert {}: {e}", cert.display())))?,
        );
    }
    if let Some(headers) = &config.headers {
        builder = builder.default_headers(parse_headers(headers)?);
    }

    Ok(builder.build()?)
}

/// Parse newline-separated `Name: value` header lines.
fn parse_headers(raw: &str) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            ClientError::InvalidResponse(format!("malformed header line: {line}"))
        })?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| ClientError::InvalidResponse(format!("invalid header name: {e}")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| ClientError::InvalidResponse(format!("invalid header value: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
