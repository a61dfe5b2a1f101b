//! Authorized-user provider backed by a token cache file.

use crate::errors::AuthenticationError;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    request_token, AccessToken, AuthProvider, AuthorizedUserToken, ClientSecrets,
    InstalledAppFlow, TokenCache, TokenResponse,
};

/// OAuth 2.0 provider for one end-user account.
///
/// Tokens are resolved in order: a still-valid cached access token, a
/// refresh using the cached refresh token, then the interactive consent
/// flow. Every newly obtained token is written back to the cache file.
///
/// # Thread Safety
///
/// The current access token sits behind an RwLock so the provider can be
/// shared between clients.
pub struct AuthorizedUserProvider {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    cache: TokenCache,
    refresh_token: RwLock<Option<SecretString>>,
    cached_token: Arc<RwLock<Option<AccessToken>>>,
    http_client: Client,
}

impl AuthorizedUserProvider {
    /// Creates a provider from a known refresh token.
    pub fn new(
        secrets: ClientSecrets,
        scopes: Vec<String>,
        cache: TokenCache,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            secrets,
            scopes,
            cache,
            refresh_token: RwLock::new(refresh_token.map(SecretString::new)),
            cached_token: Arc::new(RwLock::new(None)),
            http_client: Client::new(),
        }
    }

    /// Loads credentials for the account whose tokens live at `cache_path`,
    /// running the consent flow when the cache cannot produce a token.
    pub async fn load_or_authorize(
        secrets: ClientSecrets,
        cache_path: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Result<Self, AuthenticationError> {
        let cache = TokenCache::new(cache_path);
        let stored = cache.load().await?.filter(|t| {
            let covered = t.covers_scopes(&scopes);
            if !covered {
                tracing::warn!(path = %cache.path().display(), "Cached token lacks requested scopes");
            }
            covered
        });

        if let Some(stored) = stored {
            let provider = Self::new(
                secrets.clone(),
                scopes.clone(),
                cache.clone(),
                stored.refresh_token.clone(),
            );

            if let Some(access) = stored.access_token() {
                tracing::debug!(path = %cache.path().display(), "Using cached access token");
                *provider.cached_token.write().await = Some(access);
                return Ok(provider);
            }

            if stored.refresh_token.is_some() {
                match provider.refresh_token().await {
                    Ok(_) => return Ok(provider),
                    Err(e) => {
                        tracing::warn!(error = %e, "Refreshing cached credentials failed");
                    }
                }
            }
        }

        let provider = Self::new(secrets, scopes, cache, None);
        let response = InstalledAppFlow::new(provider.secrets.clone(), provider.scopes.clone())
            .run_local_server()
            .await?;
        provider.store(response).await?;
        Ok(provider)
    }

    /// Path of the token cache file.
    pub fn cache_path(&self) -> &std::path::Path {
        self.cache.path()
    }

    async fn refresh_access_token(&self) -> Result<TokenResponse, AuthenticationError> {
        let refresh_token = self.refresh_token.read().await.clone().ok_or_else(|| {
            AuthenticationError::RefreshFailed("No refresh token available".to_string())
        })?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret().as_str()),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.expose_secret().as_str()),
        ];

        request_token(&self.http_client, &self.secrets.token_uri, &form).await
    }

    /// Caches a token response in memory and on disk.
    async fn store(&self, response: TokenResponse) -> Result<AccessToken, AuthenticationError> {
        let expires_at = response.expires_at();
        let scopes = response.scopes().unwrap_or_else(|| self.scopes.clone());

        // Google omits the refresh token on refresh grants; keep the old one.
        if let Some(new_refresh) = response.refresh_token {
            *self.refresh_token.write().await = Some(SecretString::new(new_refresh));
        }

        let token = AccessToken::new(
            response.access_token.clone(),
            response.token_type,
            expires_at,
            scopes.clone(),
        );

        let refresh_token = self
            .refresh_token
            .read()
            .await
            .as_ref()
            .map(|t| t.expose_secret().clone());

        self.cache
            .save(&AuthorizedUserToken {
                token: Some(response.access_token),
                refresh_token,
                token_uri: Some(self.secrets.token_uri.clone()),
                client_id: Some(self.secrets.client_id.clone()),
                client_secret: Some(self.secrets.client_secret.expose_secret().clone()),
                scopes,
                expiry: Some(expires_at),
            })
            .await?;

        *self.cached_token.write().await = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl AuthProvider for AuthorizedUserProvider {
    async fn get_access_token(&self) -> Result<AccessToken, AuthenticationError> {
        let cached = self.cached_token.read().await;
        if let Some(token) = cached.as_ref() {
            if !token.needs_refresh() {
                return Ok(token.clone());
            }
        }
        drop(cached);

        self.refresh_token().await
    }

    async fn refresh_token(&self) -> Result<AccessToken, AuthenticationError> {
        let response = self.refresh_access_token().await?;
        let token = self.store(response).await?;
        tracing::debug!(path = %self.cache.path().display(), "Refreshed access token");
        Ok(token)
    }

    fn is_expired(&self) -> bool {
        match self.cached_token.try_read() {
            Ok(cached) => cached.as_ref().map_or(true, |t| t.is_expired()),
            Err(_) => false,
        }
    }
}
