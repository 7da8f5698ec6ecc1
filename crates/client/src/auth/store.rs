//! Token persistence keyed by the Leap endpoint the tokens belong to.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::token::AuthToken;
use crate::error::{ClientError, Result};

/// On-disk shape of a persisted token. Secrets are exposed explicitly at
/// this boundary and nowhere else.
#[derive(Serialize, Deserialize)]
struct StoredToken {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    scope: Option<String>,
}

impl From<&AuthToken> for StoredToken {
    fn from(token: &AuthToken) -> Self {
        Self {
            access_token: token
                .access_token
                .as_ref()
                .map(|s| s.expose_secret().to_owned()),
            refresh_token: token
                .refresh_token
                .as_ref()
                .map(|s| s.expose_secret().to_owned()),
            expires_at: token.expires_at,
            scope: token.scope.clone(),
        }
    }
}

impl From<StoredToken> for AuthToken {
    fn from(stored: StoredToken) -> Self {
        Self {
            access_token: stored.access_token.map(|s| SecretString::new(s.into())),
            refresh_token: stored.refresh_token.map(|s| SecretString::new(s.into())),
            expires_at: stored.expires_at,
            scope: stored.scope,
        }
    }
}

/// Where tokens live between invocations. Keys are the Leap endpoint the
/// tokens were issued against; tokens for one endpoint never leak to
/// another.
pub trait TokenStore: Send + Sync {
    fn load(&self, endpoint: &str) -> Result<Option<AuthToken>>;
    fn save(&self, endpoint: &str, token: &AuthToken) -> Result<()>;
    fn delete(&self, endpoint: &str) -> Result<()>;
}

/// JSON-file-per-endpoint store under the platform data directory.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory.
    pub fn user_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", qcloud_config::constants::APP_DIR_NAME)
            .ok_or_else(|| ClientError::TokenStore("data directory unavailable".into()))?;
        Ok(Self::new(dirs.data_dir().join("tokens")))
    }

    fn path_for(&self, endpoint: &str) -> PathBuf {
        let digest = Sha256::digest(endpoint.as_bytes());
        let key: String = digest.iter().take(16).map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{key}.json"))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, endpoint: &str) -> Result<Option<AuthToken>> {
        let path = self.path_for(endpoint);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::TokenStore(e.to_string())),
        };
        let stored: StoredToken = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::TokenStore(format!("corrupt token file: {e}")))?;
        Ok(Some(stored.into()))
    }

    fn save(&self, endpoint: &str, token: &AuthToken) -> Result<()> {
        let path = self.path_for(endpoint);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::TokenStore(e.to_string()))?;
        }
        let stored = StoredToken::from(token);
        let json = serde_json::to_vec_pretty(&stored)
            .map_err(|e| ClientError::TokenStore(e.to_string()))?;

        // Temp-then-rename so a crash never leaves a half-written token.
        let tmp = path.with_extension(format!("{}.tmp", std::process::id()));
        std::fs::write(&tmp, json).map_err(|e| ClientError::TokenStore(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| ClientError::TokenStore(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, endpoint: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(endpoint)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::TokenStore(e.to_string())),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<String, AuthToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, endpoint: &str) -> Result<Option<AuthToken>> {
        let guard = self
            .tokens
            .lock()
            .map_err(|_| ClientError::TokenStore("token store lock poisoned".into()))?;
        Ok(guard.get(endpoint).cloned())
    }

    fn save(&self, endpoint: &str, token: &AuthToken) -> Result<()> {
        let mut guard = self
            .tokens
            .lock()
            .map_err(|_| ClientError::TokenStore("token store lock poisoned".into()))?;
        guard.insert(endpoint.to_owned(), token.clone());
        Ok(())
    }

    fn delete(&self, endpoint: &str) -> Result<()> {
        let mut guard = self
            .tokens
            .lock()
            .map_err(|_| ClientError::TokenStore("token store lock poisoned".into()))?;
        guard.remove(endpoint);
        Ok(())
    }
}
