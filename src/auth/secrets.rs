//! OAuth client secret bundle.

use crate::errors::ConfigurationError;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

use super::{AUTH_URL, TOKEN_URL};

/// OAuth 2.0 client identity read from a `credentials.json` bundle.
///
/// Accepts both the "installed" (desktop) and "web" layouts.
#[derive(Debug, Clone)]
pub struct ClientSecrets {
    /// Client ID.
    pub client_id: String,
    /// Client secret.
    pub client_secret: SecretString,
    /// Consent endpoint.
    pub auth_uri: String,
    /// Token endpoint.
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<SecretsEntry>,
    web: Option<SecretsEntry>,
}

#[derive(Deserialize)]
struct SecretsEntry {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientSecrets {
    /// Creates secrets for the default Google endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            auth_uri: AUTH_URL.to_string(),
            token_uri: TOKEN_URL.to_string(),
        }
    }

    /// Overrides the token endpoint.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// Parses a client secret bundle.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let file: SecretsFile = serde_json::from_str(json).map_err(|e| {
            ConfigurationError::InvalidCredentials(format!("Malformed client secrets: {}", e))
        })?;

        let entry = file.installed.or(file.web).ok_or_else(|| {
            ConfigurationError::InvalidCredentials(
                "Client secrets must contain an \"installed\" or \"web\" section".to_string(),
            )
        })?;

        Ok(Self {
            client_id: entry.client_id,
            client_secret: SecretString::new(entry.client_secret),
            auth_uri: entry.auth_uri.unwrap_or_else(|| AUTH_URL.to_string()),
            token_uri: entry.token_uri.unwrap_or_else(|| TOKEN_URL.to_string()),
        })
    }

    /// Reads a client secret bundle from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::MissingCredentials(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}
