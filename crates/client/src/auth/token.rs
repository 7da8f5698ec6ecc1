//! The stored token pair and its expiry arithmetic.

use chrono::{DateTime, Utc};
use qcloud_config::constants::TOKEN_EXPIRY_BUFFER;
use secrecy::SecretString;

/// An OAuth token pair as held in memory. Secrets are wrapped so they stay
/// out of debug output and logs.
#[derive(Debug, Clone, Default)]
pub struct AuthToken {
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

impl AuthToken {
    /// Whether the access token is absent or inside the expiry buffer.
    ///
    /// A token without a recorded expiry is treated as still valid; the
    /// server will reject it if that turns out to be wrong.
    pub fn needs_refresh(&self) -> bool {
        if self.access_token.is_none() {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(TOKEN_EXPIRY_BUFFER.as_secs() as i64);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Merge a refresh response into this token. Servers are allowed to omit
    /// the refresh token from a refresh response, in which case the previous
    /// one stays valid and is kept.
    pub fn merge_refreshed(&mut self, fresh: AuthToken) {
        self.access_token = fresh.access_token;
        self.expires_at = fresh.expires_at;
        if fresh.refresh_token.is_some() {
            self.refresh_token = fresh.refresh_token;
        }
        if fresh.scope.is_some() {
            self.scope = fresh.scope;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use secrecy::ExposeSecret;

    use super::*;

    fn token(expires_in_secs: i64) -> AuthToken {
        AuthToken {
            access_token: Some(SecretString::new("at".into())),
            refresh_token: Some(SecretString::new("rt".into())),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in_secs)),
            scope: None,
        }
    }

    #[test]
    fn fresh_token_does_not_need_refresh() {
        assert!(!token(3600).needs_refresh());
    }

    #[test]
    fn token_inside_buffer_needs_refresh() {
        assert!(token(10).needs_refresh());
    }

    #[test]
    fn expired_token_needs_refresh() {
        assert!(token(-100).needs_refresh());
    }

    #[test]
    fn token_without_expiry_is_assumed_valid() {
        let mut t = token(3600);
        t.expires_at = None;
        assert!(!t.needs_refresh());
    }

    #[test]
    fn missing_access_token_always_needs_refresh() {
        let mut t = token(3600);
        t.access_token = None;
        assert!(t.needs_refresh());
    }

    #[test]
    fn merge_keeps_old_refresh_token_when_omitted() {
        let mut current = token(10);
        let fresh = AuthToken {
            access_token: Some(SecretString::new("at2".into())),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::seconds(3600)),
            scope: None,
        };
        current.merge_refreshed(fresh);
        assert_eq!(
            current.refresh_token.as_ref().unwrap().expose_secret(),
            "rt"
        );
        assert_eq!(current.access_token.as_ref().unwrap().expose_secret(), "at2");
        assert!(!current.needs_refresh());
    }
}
