//! Per-account token cache file.

use crate::errors::AuthenticationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::AccessToken;

/// Token file contents, in Google's "authorized user" layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUserToken {
    /// Last access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Long-lived refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token endpoint used for refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,

    /// Client ID the tokens were issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Client secret the tokens were issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Access token expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUserToken {
    /// Returns the cached access token when it is present and not close to expiry.
    pub fn access_token(&self) -> Option<AccessToken> {
        let token = self.token.as_ref()?;
        let expiry = self.expiry?;
        let access = AccessToken::new(token.clone(), "Bearer", expiry, self.scopes.clone());
        if access.needs_refresh() {
            None
        } else {
            Some(access)
        }
    }

    /// Whether the cached grant covers every requested scope.
    pub fn covers_scopes(&self, requested: &[String]) -> bool {
        requested.iter().all(|s| self.scopes.contains(s))
    }
}

/// JSON token cache at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Creates a cache backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached token. A missing file is not an error.
    pub async fn load(&self) -> Result<Option<AuthorizedUserToken>, AuthenticationError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthenticationError::TokenCache(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            AuthenticationError::TokenCache(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Writes the token, replacing any previous contents.
    pub async fn save(&self, token: &AuthorizedUserToken) -> Result<(), AuthenticationError> {
        let json = serde_json::to_string_pretty(token)
            .map_err(|e| AuthenticationError::TokenCache(e.to_string()))?;

        tokio::fs::write(&self.path, json).await.map_err(|e| {
            AuthenticationError::TokenCache(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), "Saved token cache");
        Ok(())
    }
}
