//! Google Drive API client implementation.

use crate::auth::AuthProvider;
use crate::config::GoogleDriveConfig;
use crate::errors::{GoogleDriveError, GoogleDriveResult};
use crate::services::{AboutService, FilesService, PermissionsService};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;

mod executor;
pub use executor::RequestExecutor;

/// Google Drive API client.
///
/// One client per authenticated account. It provides access to the service
/// modules and owns the transport and auth used by all of them.
pub struct GoogleDriveClient {
    /// Configuration.
    config: GoogleDriveConfig,
    /// Request executor (handles auth, error mapping, batching).
    executor: Arc<RequestExecutor>,
}

impl GoogleDriveClient {
    /// Creates a new Google Drive client with the given configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use google_drive_transfer::{AuthorizedUserProvider, ClientSecrets, GoogleDriveClient, GoogleDriveConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let secrets = ClientSecrets::from_file("credentials.json")?;
    /// let auth = AuthorizedUserProvider::load_or_authorize(
    ///     secrets,
    ///     "token_user1.json",
    ///     vec!["https://www.googleapis.com/auth/drive".to_string()],
    /// )
    /// .await?;
    ///
    /// let config = GoogleDriveConfig::builder()
    ///     .auth_provider(auth)
    ///     .build()?;
    ///
    /// let client = GoogleDriveClient::new(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: GoogleDriveConfig) -> GoogleDriveResult<Self> {
        config.validate()?;

        let transport = ReqwestTransport::from_config(&config).map_err(|e| {
            GoogleDriveError::configuration(format!("Failed to create transport: {}", e))
        })?;

        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(
        config: GoogleDriveConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> GoogleDriveResult<Self> {
        config.validate()?;

        let auth = config.auth_provider.clone();
        let executor = Arc::new(RequestExecutor::new(config.clone(), transport, auth));

        Ok(Self { config, executor })
    }

    /// Creates a new client builder.
    pub fn builder() -> GoogleDriveClientBuilder {
        GoogleDriveClientBuilder::new()
    }

    /// Access the files service for file operations.
    pub fn files(&self) -> FilesService {
        FilesService::new(self.executor.clone())
    }

    /// Access the permissions service for managing file permissions.
    pub fn permissions(&self) -> PermissionsService {
        PermissionsService::new(self.executor.clone())
    }

    /// Access the about service for user info.
    pub fn about(&self) -> AboutService {
        AboutService::new(self.executor.clone())
    }

    /// Gets the base URL for the API.
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    /// Gets the configuration.
    pub fn config(&self) -> &GoogleDriveConfig {
        &self.config
    }

    /// Gets the request executor (for advanced use cases).
    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }
}

/// Builder for GoogleDriveClient.
///
/// Provides a fluent API for constructing a client with custom configuration.
pub struct GoogleDriveClientBuilder {
    config_builder: crate::config::GoogleDriveConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl GoogleDriveClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: GoogleDriveConfig::builder(),
            transport: None,
        }
    }

    /// Sets the authentication provider.
    pub fn auth_provider<A: AuthProvider + 'static>(mut self, provider: A) -> Self {
        self.config_builder = self.config_builder.auth_provider(provider);
        self
    }

    /// Sets the authentication provider from an Arc.
    pub fn auth_provider_arc(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.config_builder = self.config_builder.auth_provider_arc(provider);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the batch endpoint URL.
    pub fn batch_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.batch_url(url);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.connect_timeout(timeout);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GoogleDriveResult<GoogleDriveClient> {
        let config = self.config_builder.build()?;
        match self.transport {
            Some(transport) => GoogleDriveClient::with_transport(config, transport),
            None => GoogleDriveClient::new(config),
        }
    }
}

impl Default for GoogleDriveClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
