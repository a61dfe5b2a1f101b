//! Installed-application consent flow.
//!
//! Prints a consent URL, waits for Google to redirect the browser to a
//! loopback listener, and exchanges the returned code (RFC 7636 PKCE, S256).

use crate::errors::AuthenticationError;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use super::{request_token, ClientSecrets, TokenResponse};

const VERIFIER_LENGTH: usize = 64;
const MAX_REQUEST_BYTES: usize = 16 * 1024;

const SUCCESS_PAGE: &str = "The authentication flow has completed. You may close this window.";

/// PKCE verifier and its S256 challenge.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Secret verifier sent with the code exchange.
    pub verifier: String,
    /// `BASE64URL(SHA256(verifier))`, sent with the consent request.
    pub challenge: String,
}

impl PkceChallenge {
    /// Generates a random verifier.
    pub fn generate() -> Self {
        let verifier: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(VERIFIER_LENGTH)
            .map(char::from)
            .collect();
        Self::from_verifier(verifier)
    }

    /// Derives the challenge for a known verifier.
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let hash = Sha256::digest(verifier.as_bytes());
        let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash);
        Self {
            verifier,
            challenge,
        }
    }
}

/// Interactive consent flow for desktop clients.
pub struct InstalledAppFlow {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    http_client: Client,
}

impl InstalledAppFlow {
    /// Creates a flow requesting `scopes`.
    pub fn new(secrets: ClientSecrets, scopes: Vec<String>) -> Self {
        Self {
            secrets,
            scopes,
            http_client: Client::new(),
        }
    }

    /// Builds the consent URL the user must open.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        pkce: &PkceChallenge,
    ) -> Result<Url, AuthenticationError> {
        let scope = self.scopes.join(" ");
        Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", scope.as_str()),
                ("state", state),
                ("code_challenge", pkce.challenge.as_str()),
                ("code_challenge_method", "S256"),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AuthenticationError::ConsentFailed(format!("Invalid auth URI: {}", e)))
    }

    /// Runs the flow against a loopback listener on an ephemeral port.
    pub(crate) async fn run_local_server(&self) -> Result<TokenResponse, AuthenticationError> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| AuthenticationError::ConsentFailed(format!("Cannot bind listener: {}", e)))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthenticationError::ConsentFailed(e.to_string()))?
            .port();

        let redirect_uri = format!("http://127.0.0.1:{}/", port);
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(30)
            .map(char::from)
            .collect();
        let pkce = PkceChallenge::generate();

        let url = self.authorization_url(&redirect_uri, &state, &pkce)?;
        tracing::info!("Please visit this URL to authorize this application: {}", url);

        let code = wait_for_code(&listener, &state).await?;
        self.exchange_code(&code, &redirect_uri, &pkce).await
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        pkce: &PkceChallenge,
    ) -> Result<TokenResponse, AuthenticationError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.expose_secret().as_str()),
            ("code_verifier", pkce.verifier.as_str()),
        ];

        request_token(&self.http_client, &self.secrets.token_uri, &form)
            .await
            .map_err(|e| AuthenticationError::ConsentFailed(e.to_string()))
    }
}

/// Accepts connections until the redirect carrying the code arrives.
async fn wait_for_code(listener: &TcpListener, state: &str) -> Result<String, AuthenticationError> {
    loop {
        let (mut stream, _) = listener
            .accept()
            .await
            .map_err(|e| AuthenticationError::ConsentFailed(e.to_string()))?;

        let mut buf = Vec::with_capacity(1024);
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") && buf.len() < MAX_REQUEST_BYTES {
            let n = stream
                .read(&mut chunk)
                .await
                .map_err(|e| AuthenticationError::ConsentFailed(e.to_string()))?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let request = String::from_utf8_lossy(&buf);
        let request_line = request.lines().next().unwrap_or_default();
        let outcome = parse_redirect_request(request_line, state);

        let (status, body) = match &outcome {
            Ok(Some(_)) => ("200 OK", SUCCESS_PAGE.to_string()),
            Ok(None) => ("404 Not Found", String::new()),
            Err(e) => ("400 Bad Request", e.to_string()),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        // The browser may already have gone away; the code is what matters.
        let _ = stream.write_all(response.as_bytes()).await;

        if let Some(code) = outcome? {
            return Ok(code);
        }
    }
}

/// Extracts the authorization code from a redirect request line.
///
/// Returns `Ok(None)` for unrelated requests (such as `/favicon.ico`).
pub fn parse_redirect_request(
    request_line: &str,
    expected_state: &str,
) -> Result<Option<String>, AuthenticationError> {
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return Ok(None);
    };

    let url = Url::parse(&format!("http://127.0.0.1{}", target))
        .map_err(|e| AuthenticationError::ConsentFailed(format!("Malformed redirect: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(AuthenticationError::ConsentFailed(format!(
                    "Authorization denied: {}",
                    value
                )))
            }
            _ => {}
        }
    }

    let Some(code) = code else {
        return Ok(None);
    };

    if state.as_deref() != Some(expected_state) {
        return Err(AuthenticationError::ConsentFailed(
            "State mismatch in authorization redirect".to_string(),
        ));
    }

    Ok(Some(code))
}
