//! Authentication for Google Drive accounts.
//!
//! Each account taking part in a transfer is an "authorized user": an
//! OAuth 2.0 client secret bundle shared by all accounts plus one token
//! cache file per account.
//!
//! - [`ClientSecrets`] reads the `credentials.json` bundle downloaded from
//!   the Google Cloud console.
//! - [`TokenCache`] reads and writes the per-account token file.
//! - [`InstalledAppFlow`] runs the interactive consent flow when no usable
//!   refresh token exists.
//! - [`AuthorizedUserProvider`] ties them together behind [`AuthProvider`].
//!
//! # Example
//!
//! ```no_run
//! use google_drive_transfer::auth::{AuthProvider, AuthorizedUserProvider, ClientSecrets};
//! use google_drive_transfer::config::scopes;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secrets = ClientSecrets::from_file("credentials.json")?;
//! let provider = AuthorizedUserProvider::load_or_authorize(
//!     secrets,
//!     "token_user1.json",
//!     vec![scopes::DRIVE.to_string()],
//! )
//! .await?;
//!
//! let token = provider.get_access_token().await?;
//! # Ok(())
//! # }
//! ```

use crate::errors::AuthenticationError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

mod authorized_user;
mod cache;
mod flow;
mod secrets;

pub use authorized_user::AuthorizedUserProvider;
pub use cache::{AuthorizedUserToken, TokenCache};
pub use flow::{parse_redirect_request, InstalledAppFlow, PkceChallenge};
pub use secrets::ClientSecrets;

/// Default Google OAuth2 token URL.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Default Google OAuth2 consent URL.
pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Token expiry buffer (5 minutes) - refresh tokens proactively before expiry.
pub const TOKEN_EXPIRY_BUFFER_SECONDS: i64 = 300;

/// Authentication provider abstraction.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Get an access token for API requests.
    async fn get_access_token(&self) -> Result<AccessToken, AuthenticationError>;

    /// Force refresh the access token.
    async fn refresh_token(&self) -> Result<AccessToken, AuthenticationError>;

    /// Check if the current token is expired.
    fn is_expired(&self) -> bool;
}

/// Access token with metadata.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token string.
    pub token: SecretString,

    /// Token type (usually "Bearer").
    pub token_type: String,

    /// Expiration time.
    pub expires_at: DateTime<Utc>,

    /// Scopes granted.
    pub scopes: Vec<String>,
}

impl AccessToken {
    /// Creates a new access token.
    pub fn new(
        token: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            token: SecretString::new(token.into()),
            token_type: token_type.into(),
            expires_at,
            scopes,
        }
    }

    /// Checks if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Checks if the token needs proactive refresh (within 5 minutes of expiry).
    pub fn needs_refresh(&self) -> bool {
        let threshold = self.expires_at - Duration::seconds(TOKEN_EXPIRY_BUFFER_SECONDS);
        Utc::now() >= threshold
    }

    /// Returns the authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.token.expose_secret())
    }
}

/// Token endpoint response for both the code exchange and the refresh grant.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    pub(crate) fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.expires_in.unwrap_or(3600))
    }

    pub(crate) fn scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_ref()
            .map(|s| s.split_whitespace().map(String::from).collect())
    }
}

/// Posts a form-encoded grant to the token endpoint.
pub(crate) async fn request_token(
    http_client: &Client,
    token_url: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthenticationError> {
    let response = http_client
        .post(token_url)
        .form(form)
        .send()
        .await
        .map_err(|e| AuthenticationError::RefreshFailed(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(AuthenticationError::RefreshFailed(format!(
            "Token endpoint returned status {}: {}",
            status, text
        )));
    }

    response.json::<TokenResponse>().await.map_err(|e| {
        AuthenticationError::RefreshFailed(format!("Failed to parse response: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_expiry() {
        let expires_at = Utc::now() + Duration::hours(1);
        let token = AccessToken::new("test_token", "Bearer", expires_at, vec![]);
        assert!(!token.is_expired());

        let expired = Utc::now() - Duration::hours(1);
        let token = AccessToken::new("test_token", "Bearer", expired, vec![]);
        assert!(token.is_expired());
    }

    #[test]
    fn test_access_token_needs_refresh() {
        let expires_at = Utc::now() + Duration::hours(1);
        let token = AccessToken::new("test_token", "Bearer", expires_at, vec![]);
        assert!(!token.needs_refresh());

        // Inside the 5 minute buffer
        let expires_soon = Utc::now() + Duration::minutes(4);
        let token = AccessToken::new("test_token", "Bearer", expires_soon, vec![]);
        assert!(token.needs_refresh());
    }

    #[test]
    fn test_authorization_header() {
        let expires_at = Utc::now() + Duration::hours(1);
        let token = AccessToken::new("test_token", "Bearer", expires_at, vec![]);
        assert_eq!(token.authorization_header(), "Bearer test_token");
    }

    #[test]
    fn test_token_response_scopes() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","expires_in":3599,"scope":"a b","token_type":"Bearer"}"#,
        )
        .unwrap();

        assert_eq!(response.scopes(), Some(vec!["a".to_string(), "b".to_string()]));
        assert!(response.refresh_token.is_none());
        assert!(response.expires_at() > Utc::now());
    }
}
