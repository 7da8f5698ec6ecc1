//! Token lifecycle state machine over the OAuth collaborators.
//!
//! The manager owns the current token pair for one Leap endpoint, keeps the
//! persisted copy in sync, and exposes the four lifecycle operations: login,
//! get, refresh, revoke.

use secrecy::{ExposeSecret, SecretString};

use crate::api::oauth::{OauthApi, PkceChallenge, generate_state};
use crate::auth::flows::OauthFlow;
use crate::auth::store::TokenStore;
use crate::auth::token::AuthToken;
use crate::error::{ClientError, Result};

/// Which of the two tokens an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// RFC 7009 `token_type_hint` value.
    pub fn as_hint(&self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Refresh => "refresh_token",
        }
    }
}

/// Observable lifecycle state of the managed token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
    Revoked(TokenKind),
}

/// How a login obtains the authorization code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// Browser redirect to a local listener.
    Redirect,
    /// Out-of-band copy/paste of the code.
    OutOfBand,
}

/// Outcome of a `login` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A new token pair was obtained.
    Authorized,
    /// An existing valid token made the login unnecessary.
    Skipped,
}

pub struct AuthTokenManager<A: OauthApi, S: TokenStore> {
    api: A,
    store: S,
    endpoint: String,
    token: Option<AuthToken>,
    state: AuthState,
}

impl<A: OauthApi, S: TokenStore> AuthTokenManager<A, S> {
    /// Build a manager for one Leap endpoint, loading any persisted token.
    pub fn new(api: A, store: S, endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let token = store.load(&endpoint)?;
        let state = match &token {
            Some(t) if t.access_token.is_some() || t.refresh_token.is_some() => {
                AuthState::Authenticated
            }
            _ => AuthState::Unauthenticated,
        };
        Ok(Self {
            api,
            store,
            endpoint,
            token,
            state,
        })
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// The current token pair, if any. Validity is not implied; use
    /// [`ensure_active_token`](Self::ensure_active_token) for that.
    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Run an authorization-code login with PKCE.
    ///
    /// With `skip_valid` set, a token that is already active (or can be made
    /// active by a refresh) short-circuits the flow without contacting the
    /// authorization endpoint.
    pub async fn login<F: OauthFlow>(
        &mut self,
        flow: &F,
        mode: LoginMode,
        skip_valid: bool,
    ) -> Result<LoginOutcome> {
        if skip_valid && self.ensure_active_token().await? {
            tracing::debug!(endpoint = %self.endpoint, "existing token still valid, skipping login");
            return Ok(LoginOutcome::Skipped);
        }

        let pkce = PkceChallenge::generate();
        let state = generate_state();

        let (redirect_uri, code) = match mode {
            LoginMode::Redirect => {
                let redirect_uri = flow.redirect_uri();
                let url = self.api.authorize_url(&pkce.challenge, &state, &redirect_uri);
                let code = flow.run_redirect_flow(&url, &state).await?;
                (redirect_uri, code)
            }
            LoginMode::OutOfBand => {
                let redirect_uri = self.api.oob_redirect_uri().to_owned();
                let url = self.api.authorize_url(&pkce.challenge, &state, &redirect_uri);
                let code = flow.run_oob_flow(&url).await?;
                (redirect_uri, code)
            }
        };

        let token = self
            .api
            .exchange_code(&code, &pkce.verifier, &redirect_uri)
            .await?;
        self.store.save(&self.endpoint, &token)?;
        self.token = Some(token);
        self.state = AuthState::Authenticated;
        Ok(LoginOutcome::Authorized)
    }

    /// One of the stored tokens, as-is. Asking for a token that is not on
    /// record is a precondition failure.
    pub fn get(&self, kind: TokenKind) -> Result<SecretString> {
        self.token
            .as_ref()
            .and_then(|t| match kind {
                TokenKind::Access => t.access_token.clone(),
                TokenKind::Refresh => t.refresh_token.clone(),
            })
            .ok_or_else(|| ClientError::Precondition {
                reason: format!("no {} on record; log in first", kind.as_hint()),
            })
    }

    /// Exchange the stored refresh token for a fresh pair.
    ///
    /// Calling this without a refresh token on hand is a precondition
    /// failure, distinct from the server refusing the exchange.
    pub async fn refresh(&mut self) -> Result<()> {
        let refresh_token = self
            .token
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or_else(|| ClientError::Precondition {
                reason: "no refresh token on record; log in first".into(),
            })?;

        let fresh = self.api.refresh(refresh_token.expose_secret()).await?;

        let current = self.token.get_or_insert_with(AuthToken::default);
        current.merge_refreshed(fresh);
        self.store.save(&self.endpoint, current)?;
        self.state = AuthState::Authenticated;
        Ok(())
    }

    /// Revoke one of the stored tokens at the server.
    ///
    /// Missing the targeted token is a precondition failure. A transport
    /// round-trip that completes with the server reporting failure is
    /// `ServerRejected`; local state is only updated on a confirmed
    /// revocation.
    pub async fn revoke(&mut self, kind: TokenKind) -> Result<()> {
        let secret = self
            .token
            .as_ref()
            .and_then(|t| match kind {
                TokenKind::Access => t.access_token.clone(),
                TokenKind::Refresh => t.refresh_token.clone(),
            })
            .ok_or_else(|| ClientError::Precondition {
                reason: format!("no {} on record", kind.as_hint()),
            })?;

        let accepted = self.api.revoke(secret.expose_secret(), kind.as_hint()).await?;
        if !accepted {
            return Err(ClientError::ServerRejected {
                reason: format!("server refused to revoke the {}", kind.as_hint()),
            });
        }

        if let Some(token) = self.token.as_mut() {
            match kind {
                TokenKind::Access => token.access_token = None,
                TokenKind::Refresh => token.refresh_token = None,
            }
            if token.access_token.is_none() && token.refresh_token.is_none() {
                self.store.delete(&self.endpoint)?;
                self.token = None;
            } else {
                self.store.save(&self.endpoint, token)?;
            }
        }
        self.state = AuthState::Revoked(kind);
        Ok(())
    }

    /// Make sure an access token usable for requests is on hand, refreshing
    /// it if it is expiring and a refresh token exists.
    ///
    /// Returns `Ok(false)` when no usable token can be produced without a
    /// new login (nothing stored, no refresh token, or the server rejected
    /// the refresh). Transport failures propagate so callers do not mistake
    /// an unreachable server for a dead session.
    pub async fn ensure_active_token(&mut self) -> Result<bool> {
        let Some(token) = self.token.as_ref() else {
            return Ok(false);
        };
        if !token.needs_refresh() {
            return Ok(true);
        }
        if !token.has_refresh_token() {
            return Ok(false);
        }
        match self.refresh().await {
            Ok(()) => Ok(true),
            Err(ClientError::RemoteRejected { reason }) => {
                tracing::debug!(%reason, "refresh rejected, token is dead");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// The active access token, refreshing first if needed.
    pub async fn active_access_token(&mut self) -> Result<SecretString> {
        if !self.ensure_active_token().await? {
            return Err(ClientError::Precondition {
                reason: "no active token; log in first".into(),
            });
        }
        self.token
            .as_ref()
            .and_then(|t| t.access_token.clone())
            .ok_or_else(|| ClientError::Precondition {
                reason: "no active token; log in first".into(),
            })
    }
}
