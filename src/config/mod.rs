//! Configuration for the Google Drive client.

use crate::auth::AuthProvider;
use crate::errors::{ConfigurationError, GoogleDriveError, GoogleDriveResult};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3/";

/// Default batch endpoint.
pub const DEFAULT_BATCH_URL: &str = "https://www.googleapis.com/batch/drive/v3";

/// OAuth 2.0 scopes for Google Drive.
pub mod scopes {
    /// Full access to Drive files.
    pub const DRIVE: &str = "https://www.googleapis.com/auth/drive";

    /// Read-only access to file metadata and content.
    pub const DRIVE_READONLY: &str = "https://www.googleapis.com/auth/drive.readonly";

    /// Read-only access to file metadata (no content).
    pub const DRIVE_METADATA_READONLY: &str =
        "https://www.googleapis.com/auth/drive.metadata.readonly";
}

/// Configuration for the Google Drive client.
#[derive(Clone)]
pub struct GoogleDriveConfig {
    /// Authentication provider.
    pub auth_provider: Arc<dyn AuthProvider>,

    /// Base URL for the API. Always ends with `/`.
    pub base_url: Url,

    /// URL of the batch endpoint.
    pub batch_url: Url,

    /// Default timeout for requests.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl std::fmt::Debug for GoogleDriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDriveConfig")
            .field("base_url", &self.base_url.as_str())
            .field("batch_url", &self.batch_url.as_str())
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl GoogleDriveConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GoogleDriveConfigBuilder {
        GoogleDriveConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GoogleDriveResult<()> {
        if !is_secure_or_loopback(&self.base_url) {
            return Err(GoogleDriveError::Configuration(
                ConfigurationError::InvalidConfiguration("Base URL must use HTTPS".to_string()),
            ));
        }

        if !is_secure_or_loopback(&self.batch_url) {
            return Err(GoogleDriveError::Configuration(
                ConfigurationError::InvalidConfiguration("Batch URL must use HTTPS".to_string()),
            ));
        }

        if self.timeout.is_zero() {
            return Err(GoogleDriveError::Configuration(
                ConfigurationError::InvalidConfiguration(
                    "Timeout must be greater than zero".to_string(),
                ),
            ));
        }

        Ok(())
    }
}

// Plain HTTP is only accepted for local test servers.
fn is_secure_or_loopback(url: &Url) -> bool {
    match url.scheme() {
        "https" => true,
        "http" => matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]")),
        _ => false,
    }
}

fn parse_url(raw: &str, what: &str) -> GoogleDriveResult<Url> {
    Url::parse(raw).map_err(|e| {
        GoogleDriveError::Configuration(ConfigurationError::InvalidConfiguration(format!(
            "Invalid {}: {}",
            what, e
        )))
    })
}

/// Builder for GoogleDriveConfig.
pub struct GoogleDriveConfigBuilder {
    auth_provider: Option<Arc<dyn AuthProvider>>,
    base_url: Option<String>,
    batch_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl GoogleDriveConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            auth_provider: None,
            base_url: None,
            batch_url: None,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }

    /// Sets the authentication provider.
    pub fn auth_provider<A: AuthProvider + 'static>(mut self, provider: A) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the authentication provider from an Arc.
    pub fn auth_provider_arc(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth_provider = Some(provider);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the batch endpoint URL.
    pub fn batch_url(mut self, url: impl Into<String>) -> Self {
        self.batch_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> GoogleDriveResult<GoogleDriveConfig> {
        let auth_provider = self.auth_provider.ok_or_else(|| {
            GoogleDriveError::Configuration(ConfigurationError::MissingCredentials(
                "Authentication provider is required".to_string(),
            ))
        })?;

        // Url::join drops the last path segment unless the base ends with '/'.
        let mut base = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = parse_url(&base, "base URL")?;

        let batch_url = parse_url(
            self.batch_url.as_deref().unwrap_or(DEFAULT_BATCH_URL),
            "batch URL",
        )?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("google-drive-transfer/{}", env!("CARGO_PKG_VERSION")));

        let config = GoogleDriveConfig {
            auth_provider,
            base_url,
            batch_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            user_agent,
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for GoogleDriveConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
