//! OAuth endpoint collaborator: authorization, code exchange, refresh and
//! revocation against the Leap API.
//!
//! The interactive parts of a login (opening a browser, receiving the
//! redirect, prompting for an out-of-band code) live outside this module;
//! only the token-endpoint mechanics are here.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration as ChronoDuration, Utc};
use qcloud_config::ResolvedConfig;
use rand::RngCore;
use secrecy::SecretString;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::auth::token::AuthToken;
use crate::error::{ClientError, Result};

const CLIENT_ID: &str = "f61b4b2a-8f5d-4c25-9c1a-qcloud-cli";
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// PKCE code verifier and challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(digest);

        Self { verifier, challenge }
    }
}

/// Random state string for CSRF protection.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// The OAuth endpoints, specified at their interface boundary.
#[async_trait]
pub trait OauthApi: Send + Sync {
    /// Authorization URL for a PKCE login.
    fn authorize_url(&self, challenge: &str, state: &str, redirect_uri: &str) -> String;

    /// The out-of-band redirect URI for copy/paste logins.
    fn oob_redirect_uri(&self) -> &str {
        OOB_REDIRECT_URI
    }

    /// Exchange an authorization code for a token pair.
    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<AuthToken>;

    /// Exchange a refresh token for a new token pair. An explicit remote
    /// refusal is `RemoteRejected`; transport failures pass through.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthToken>;

    /// Revoke a token. Returns the server's verdict: `false` means the
    /// server reported failure without a transport error.
    async fn revoke(&self, token: &str, token_type_hint: &str) -> Result<bool>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

impl From<TokenResponse> for AuthToken {
    fn from(response: TokenResponse) -> Self {
        AuthToken {
            access_token: Some(SecretString::new(response.access_token.into())),
            refresh_token: response
                .refresh_token
                .map(|t| SecretString::new(t.into())),
            expires_at: response
                .expires_in
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
            scope: response.scope,
        }
    }
}

/// reqwest-backed OAuth client parameterized by the Leap API endpoint.
pub struct HttpOauthApi {
    client: reqwest::Client,
    base: Url,
    timeout: std::time::Duration,
}

impl HttpOauthApi {
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let base = Url::parse(&config.leap_api_endpoint)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid leap endpoint: {e}")))?;
        Ok(Self {
            client: super::http_client(config)?,
            base,
            timeout: config.request_timeout,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid oauth URL: {e}")))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<reqwest::Response> {
        let url = self.url("openid/token")?;
        self.client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))
    }
}

#[async_trait]
impl OauthApi for HttpOauthApi {
    fn authorize_url(&self, challenge: &str, state: &str, redirect_uri: &str) -> String {
        let params = [
            ("response_type", "code"),
            ("client_id", CLIENT_ID),
            ("redirect_uri", redirect_uri),
            ("scope", "openid offline_access"),
            ("code_challenge", challenge),
            ("code_challenge_method", "S256"),
            ("state", state),
        ];
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}openid/authorize?{query}", self.base)
    }

    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<AuthToken> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("client_id", CLIENT_ID),
                ("code", code),
                ("code_verifier", verifier),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::RemoteRejected {
                reason: format!("code exchange failed ({status}): {message}"),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("malformed token response: {e}")))?;
        Ok(token.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthToken> {
        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("client_id", CLIENT_ID),
                ("refresh_token", refresh_token),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::RemoteRejected {
                reason: format!("token refresh failed ({status}): {message}"),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("malformed token response: {e}")))?;
        Ok(token.into())
    }

    async fn revoke(&self, token: &str, token_type_hint: &str) -> Result<bool> {
        let url = self.url("openid/revoke")?;
        let response = self
            .client
            .post(url.clone())
            .form(&[
                ("client_id", CLIENT_ID),
                ("token", token),
                ("token_type_hint", token_type_hint),
            ])
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let status = response.status();
        // A well-formed refusal is the server's verdict, not a transport
        // error; only unexpected statuses surface as Api errors.
        match status.as_u16() {
            200..=299 => Ok(true),
            400 | 403 | 503 => {
                tracing::debug!(%url, %status, "revocation refused by server");
                Ok(false)
            }
            code => {
                let message = response.text().await.unwrap_or_default();
                Err(ClientError::Api {
                    status: code,
                    url: url.to_string(),
                    message,
                })
            }
        }
    }
}
