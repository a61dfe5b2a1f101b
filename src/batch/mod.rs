//! Codec for the Drive batch endpoint.
//!
//! A batch call carries up to [`MAX_BATCH_SIZE`] sub-requests in one
//! `multipart/mixed` body. Each part is an `application/http` message tagged
//! with `Content-ID: <item-N>`; the matching response part comes back tagged
//! `Content-ID: <response-item-N>`, in no particular order.
//!
//! ```text
//! --batch_abc
//! Content-Type: application/http
//! Content-ID: <item-0>
//!
//! POST /drive/v3/files/1a2b/copy HTTP/1.1
//! Content-Type: application/json; charset=UTF-8
//!
//! {}
//! --batch_abc--
//! ```

use crate::errors::{GoogleDriveError, GoogleDriveResult};
use crate::transport::HttpMethod;
use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// Maximum number of sub-requests Google accepts in one batch call.
pub const MAX_BATCH_SIZE: usize = 100;

/// Content-ID of the `index`-th sub-request.
pub fn content_id(index: usize) -> String {
    format!("item-{}", index)
}

/// One sub-request of a batch call.
#[derive(Debug, Clone)]
pub struct BatchPart {
    /// Content-ID without angle brackets.
    pub content_id: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute path including the query string.
    pub path: String,
    /// JSON body.
    pub body: Option<Bytes>,
}

/// A `multipart/mixed` batch request body under construction.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    boundary: String,
    parts: Vec<BatchPart>,
}

impl BatchRequest {
    /// Creates an empty batch with a random boundary.
    pub fn new() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        Self::with_boundary(format!("batch_{}", suffix))
    }

    /// Creates an empty batch with a fixed boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Appends a sub-request.
    pub fn push(
        &mut self,
        content_id: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
        body: Option<Bytes>,
    ) -> GoogleDriveResult<()> {
        if self.parts.len() >= MAX_BATCH_SIZE {
            return Err(GoogleDriveError::request(format!(
                "A batch may hold at most {} sub-requests",
                MAX_BATCH_SIZE
            )));
        }

        self.parts.push(BatchPart {
            content_id: content_id.into(),
            method,
            path: path.into(),
            body,
        });
        Ok(())
    }

    /// Sub-requests in insertion order.
    pub fn parts(&self) -> &[BatchPart] {
        &self.parts
    }

    /// Number of sub-requests.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if no sub-request was added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Multipart boundary.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the outer `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/mixed; boundary={}", self.boundary)
    }

    /// Serializes the batch body.
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::new();

        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            out.extend_from_slice(b"Content-Type: application/http\r\n");
            out.extend_from_slice(b"Content-Transfer-Encoding: binary\r\n");
            out.extend_from_slice(format!("Content-ID: <{}>\r\n\r\n", part.content_id).as_bytes());

            out.extend_from_slice(
                format!("{} {} HTTP/1.1\r\n", part.method.as_str(), part.path).as_bytes(),
            );
            match &part.body {
                Some(body) => {
                    out.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n");
                    out.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
                    out.extend_from_slice(body);
                    out.extend_from_slice(b"\r\n");
                }
                None => out.extend_from_slice(b"\r\n"),
            }
        }

        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Bytes::from(out)
    }
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// One decoded sub-response.
#[derive(Debug, Clone)]
pub struct BatchResponsePart {
    /// Content-ID of the sub-request this answers (`item-N`).
    pub content_id: String,
    /// Embedded HTTP status.
    pub status: StatusCode,
    /// Embedded response headers.
    pub headers: Vec<(String, String)>,
    /// Embedded response body.
    pub body: Bytes,
}

impl BatchResponsePart {
    /// Looks up an embedded header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decodes the body on success, or maps the embedded error.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, BatchItemError> {
        if self.status.is_success() {
            return serde_json::from_slice(&self.body).map_err(|e| BatchItemError::Failed {
                status: self.status,
                error: GoogleDriveError::deserialization(e.to_string()),
            });
        }

        let retry_after = self
            .header("Retry-After")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        Err(BatchItemError::Failed {
            status: self.status,
            error: GoogleDriveError::from_response(self.status, retry_after, &self.body),
        })
    }
}

/// Why a single sub-request produced no result.
#[derive(Debug, thiserror::Error)]
pub enum BatchItemError {
    /// The sub-request was answered with an error.
    #[error("{error} (HTTP {status})")]
    Failed {
        /// Embedded HTTP status.
        status: StatusCode,
        /// Mapped error.
        error: GoogleDriveError,
    },

    /// The batch response carried no part for the sub-request.
    #[error("No response for sub-request")]
    Missing,
}

/// Per-item result of a batch call, keyed by what the sub-request was issued for.
#[derive(Debug)]
pub struct BatchItemResult<T> {
    /// Key of the sub-request (the file id).
    pub key: String,
    /// Decoded result.
    pub result: Result<T, BatchItemError>,
}

/// Matches sub-responses to `keys` by Content-ID.
///
/// `keys[i]` is the key of the sub-request sent as `item-i`. The output has
/// one entry per key, in key order, whatever order the parts arrived in.
pub fn correlate<T: DeserializeOwned>(
    keys: &[String],
    parts: Vec<BatchResponsePart>,
) -> Vec<BatchItemResult<T>> {
    let mut by_id: HashMap<String, BatchResponsePart> = parts
        .into_iter()
        .map(|part| (part.content_id.clone(), part))
        .collect();

    let results = keys
        .iter()
        .enumerate()
        .map(|(index, key)| BatchItemResult {
            key: key.clone(),
            result: match by_id.remove(&content_id(index)) {
                Some(part) => part.into_result(),
                None => Err(BatchItemError::Missing),
            },
        })
        .collect();

    for unexpected in by_id.keys() {
        tracing::debug!(content_id = %unexpected, "Ignoring unmatched batch sub-response");
    }

    results
}

/// Extracts the `boundary` parameter of a multipart content type.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let media_type = params.next()?.trim();
    if !media_type.eq_ignore_ascii_case("multipart/mixed") {
        return None;
    }

    params.find_map(|param| {
        let (name, value) = param.trim().split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Decodes a batch response body.
pub fn parse_batch_response(
    content_type: &str,
    body: &[u8],
) -> GoogleDriveResult<Vec<BatchResponsePart>> {
    let boundary = boundary_from_content_type(content_type).ok_or_else(|| {
        GoogleDriveError::unexpected_format(format!(
            "Expected multipart/mixed batch response, got {:?}",
            content_type
        ))
    })?;

    let text = String::from_utf8_lossy(body).replace("\r\n", "\n");
    let delimiter = format!("--{}", boundary);

    let mut parts = Vec::new();
    for segment in text.split(delimiter.as_str()).skip(1) {
        if segment.starts_with("--") {
            break;
        }
        let segment = segment.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let segment = segment.strip_prefix('\n').unwrap_or(segment);
        if segment.trim().is_empty() {
            continue;
        }
        parts.push(parse_part(segment)?);
    }

    Ok(parts)
}

fn parse_part(segment: &str) -> GoogleDriveResult<BatchResponsePart> {
    let (outer, inner) = segment.split_once("\n\n").ok_or_else(|| {
        GoogleDriveError::unexpected_format("Batch part has no embedded response")
    })?;

    let content_id = parse_headers(outer.lines())
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Content-ID"))
        .map(|(_, v)| normalize_content_id(&v))
        .ok_or_else(|| GoogleDriveError::unexpected_format("Batch part is missing Content-ID"))?;

    let inner = inner.trim_start_matches('\n');
    let (head, body) = inner.split_once("\n\n").unwrap_or((inner, ""));

    let mut lines = head.lines();
    let status_line = lines.next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| {
            GoogleDriveError::unexpected_format(format!("Bad status line {:?}", status_line))
        })?;

    Ok(BatchResponsePart {
        content_id,
        status,
        headers: parse_headers(lines),
        body: Bytes::from(body.trim_end_matches('\n').to_string()),
    })
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
    lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

// "<response-item-3>" answers "<item-3>".
fn normalize_content_id(raw: &str) -> String {
    let id = raw.trim().trim_start_matches('<').trim_end_matches('>');
    id.strip_prefix("response-").unwrap_or(id).to_string()
}
