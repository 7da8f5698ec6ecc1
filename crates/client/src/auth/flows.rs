//! The interactive side of a login, abstracted so the token manager can be
//! driven by a browser redirect, a copy/paste prompt, or a test double.

use async_trait::async_trait;

use crate::error::Result;

/// Runs the user-facing half of an authorization-code flow and returns the
/// authorization code the user obtained.
///
/// Implementations receive the fully formed authorization URL; how they get
/// the user there (spawning a browser, printing the URL) and how the code
/// comes back (local redirect listener, manual paste) is up to them.
#[async_trait]
pub trait OauthFlow: Send + Sync {
    /// The redirect URI this flow listens on, known before the
    /// authorization URL is built.
    fn redirect_uri(&self) -> String;

    /// Redirect-based login: listen on a local address, send the user to
    /// `authorize_url`, and return the code delivered to the redirect along
    /// with verification of the `state` parameter.
    async fn run_redirect_flow(&self, authorize_url: &str, state: &str) -> Result<String>;

    /// Out-of-band login: present `authorize_url` and collect the code the
    /// user pastes back.
    async fn run_oob_flow(&self, authorize_url: &str) -> Result<String>;
}
