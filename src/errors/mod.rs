//! Error types for the Google Drive client.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Result type for Google Drive operations.
pub type GoogleDriveResult<T> = Result<T, GoogleDriveError>;

/// Top-level error type for the Google Drive client.
#[derive(Debug, Error)]
pub enum GoogleDriveError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Authorization error.
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Resource error.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Quota error.
    #[error("Quota error: {0}")]
    Quota(#[from] QuotaError),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Server error.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Response error.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl GoogleDriveError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        GoogleDriveError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates an authentication error.
    pub fn authentication(msg: impl Into<String>) -> Self {
        GoogleDriveError::Authentication(AuthenticationError::InvalidToken(msg.into()))
    }

    /// Creates a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        GoogleDriveError::Request(RequestError::ValidationError(msg.into()))
    }

    /// Creates a missing parameter error.
    pub fn missing_parameter(msg: impl Into<String>) -> Self {
        GoogleDriveError::Request(RequestError::MissingParameter(msg.into()))
    }

    /// Creates a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        GoogleDriveError::Resource(ResourceError::FileNotFound(msg.into()))
    }

    /// Creates a rate limit error.
    pub fn rate_limit(msg: impl Into<String>) -> Self {
        GoogleDriveError::Quota(QuotaError::UserRateLimitExceeded {
            message: msg.into(),
            retry_after: None,
        })
    }

    /// Creates a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        GoogleDriveError::Server(ServerError::InternalError(msg.into()))
    }

    /// Creates a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        GoogleDriveError::Network(NetworkError::ConnectionFailed(msg.into()))
    }

    /// Creates a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        GoogleDriveError::Response(ResponseError::DeserializationError(msg.into()))
    }

    /// Creates an unexpected-format error.
    pub fn unexpected_format(msg: impl Into<String>) -> Self {
        GoogleDriveError::Response(ResponseError::UnexpectedFormat(msg.into()))
    }

    /// Returns true if the error is transient.
    ///
    /// Only reported in logs; nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GoogleDriveError::Quota(QuotaError::UserRateLimitExceeded { .. })
                | GoogleDriveError::Quota(QuotaError::ProjectRateLimitExceeded { .. })
                | GoogleDriveError::Network(NetworkError::Timeout(_))
                | GoogleDriveError::Network(NetworkError::ConnectionFailed(_))
                | GoogleDriveError::Server(ServerError::InternalError(_))
                | GoogleDriveError::Server(ServerError::ServiceUnavailable { .. })
                | GoogleDriveError::Server(ServerError::BackendError(_))
        )
    }

    /// Returns the retry delay hint if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GoogleDriveError::Quota(QuotaError::UserRateLimitExceeded { retry_after, .. })
            | GoogleDriveError::Quota(QuotaError::ProjectRateLimitExceeded { retry_after, .. }) => {
                *retry_after
            }
            GoogleDriveError::Server(ServerError::ServiceUnavailable { retry_after, .. }) => {
                *retry_after
            }
            _ => None,
        }
    }

    /// Returns the HTTP status code if applicable.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            GoogleDriveError::Authentication(_) => Some(StatusCode::UNAUTHORIZED),
            GoogleDriveError::Authorization(_) => Some(StatusCode::FORBIDDEN),
            GoogleDriveError::Request(_) => Some(StatusCode::BAD_REQUEST),
            GoogleDriveError::Resource(ResourceError::FileNotFound(_)) => {
                Some(StatusCode::NOT_FOUND)
            }
            GoogleDriveError::Quota(_) => Some(StatusCode::TOO_MANY_REQUESTS),
            GoogleDriveError::Server(ServerError::InternalError(_)) => {
                Some(StatusCode::INTERNAL_SERVER_ERROR)
            }
            GoogleDriveError::Server(ServerError::ServiceUnavailable { .. }) => {
                Some(StatusCode::SERVICE_UNAVAILABLE)
            }
            GoogleDriveError::Server(ServerError::BadGateway(_)) => Some(StatusCode::BAD_GATEWAY),
            _ => None,
        }
    }

    /// Maps a non-success API response to a domain error.
    ///
    /// Used for plain requests and for the sub-responses of a batch call,
    /// which share Google's `{"error": {"code", "message", "errors": [...]}}` body.
    pub fn from_response(status: StatusCode, retry_after: Option<Duration>, body: &[u8]) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: ErrorDetail,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: String,
            errors: Option<Vec<ErrorItem>>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorItem {
            reason: Option<String>,
        }

        let parsed: Option<ErrorResponse> = serde_json::from_slice(body).ok();

        let (message, reason) = match parsed {
            Some(e) => {
                let reason = e
                    .error
                    .errors
                    .as_ref()
                    .and_then(|errs| errs.first())
                    .and_then(|err| err.reason.clone());
                (e.error.message, reason)
            }
            None => (
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    String::from_utf8_lossy(body)
                ),
                None,
            ),
        };

        match status {
            StatusCode::BAD_REQUEST => match reason.as_deref() {
                Some("invalidParameter") => {
                    GoogleDriveError::Request(RequestError::InvalidParameter(message))
                }
                Some("invalidQuery") => GoogleDriveError::Request(RequestError::InvalidQuery(message)),
                _ => GoogleDriveError::Request(RequestError::ValidationError(message)),
            },
            StatusCode::UNAUTHORIZED => {
                GoogleDriveError::Authentication(AuthenticationError::InvalidToken(message))
            }
            StatusCode::FORBIDDEN => match reason.as_deref() {
                Some("userRateLimitExceeded") => {
                    GoogleDriveError::Quota(QuotaError::UserRateLimitExceeded {
                        message,
                        retry_after,
                    })
                }
                Some("rateLimitExceeded") => {
                    GoogleDriveError::Quota(QuotaError::ProjectRateLimitExceeded {
                        message,
                        retry_after,
                    })
                }
                Some("storageQuotaExceeded") => {
                    GoogleDriveError::Quota(QuotaError::StorageQuotaExceeded(message))
                }
                Some("insufficientPermissions") | Some("forbidden") => {
                    GoogleDriveError::Authorization(AuthorizationError::InsufficientPermissions(
                        message,
                    ))
                }
                Some("domainPolicy") => {
                    GoogleDriveError::Authorization(AuthorizationError::DomainPolicy(message))
                }
                Some("cannotCopyFile") => {
                    GoogleDriveError::Authorization(AuthorizationError::FileNotAccessible(message))
                }
                _ => GoogleDriveError::Authorization(AuthorizationError::Forbidden(message)),
            },
            StatusCode::NOT_FOUND => GoogleDriveError::Resource(ResourceError::FileNotFound(message)),
            StatusCode::TOO_MANY_REQUESTS => {
                GoogleDriveError::Quota(QuotaError::UserRateLimitExceeded {
                    message,
                    retry_after,
                })
            }
            StatusCode::INTERNAL_SERVER_ERROR => match reason.as_deref() {
                Some("backendError") => GoogleDriveError::Server(ServerError::BackendError(message)),
                _ => GoogleDriveError::Server(ServerError::InternalError(message)),
            },
            StatusCode::BAD_GATEWAY => GoogleDriveError::Server(ServerError::BadGateway(message)),
            StatusCode::SERVICE_UNAVAILABLE => {
                GoogleDriveError::Server(ServerError::ServiceUnavailable {
                    message,
                    retry_after,
                })
            }
            _ => GoogleDriveError::Server(ServerError::InternalError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            ))),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid credentials.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Invalid token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Refresh failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Consent flow failed.
    #[error("Authorization flow failed: {0}")]
    ConsentFailed(String),

    /// Token cache could not be read or written.
    #[error("Token cache error: {0}")]
    TokenCache(String),
}

/// Authorization errors.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// Forbidden.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Insufficient permissions.
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    /// File not accessible.
    #[error("File not accessible: {0}")]
    FileNotAccessible(String),

    /// Domain policy.
    #[error("Domain policy violation: {0}")]
    DomainPolicy(String),
}

/// Request errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing parameter.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Invalid query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Resource errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Quota errors.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// Storage quota exceeded.
    #[error("Storage quota exceeded: {0}")]
    StorageQuotaExceeded(String),

    /// User rate limit exceeded.
    #[error("User rate limit exceeded: {message}")]
    UserRateLimitExceeded {
        /// Error message.
        message: String,
        /// Retry after duration.
        retry_after: Option<Duration>,
    },

    /// Project rate limit exceeded.
    #[error("Project rate limit exceeded: {message}")]
    ProjectRateLimitExceeded {
        /// Error message.
        message: String,
        /// Retry after duration.
        retry_after: Option<Duration>,
    },
}

/// Network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Internal error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Backend error.
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Service unavailable.
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
        /// Retry after duration.
        retry_after: Option<Duration>,
    },

    /// Bad gateway.
    #[error("Bad gateway: {0}")]
    BadGateway(String),
}

/// Response errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Unexpected format.
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<TransportError> for GoogleDriveError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => GoogleDriveError::Network(NetworkError::Timeout(msg)),
            TransportError::Network(msg) => {
                GoogleDriveError::Network(NetworkError::ConnectionFailed(msg))
            }
            TransportError::Http(msg) => {
                GoogleDriveError::Response(ResponseError::UnexpectedFormat(msg))
            }
        }
    }
}
