//! Captured HTTP responses as stored in cache buckets.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A response captured at install time: status, headers, and body verbatim
/// as of the moment it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    /// Normalized URL the response was fetched for.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
    /// When the response was captured.
    pub captured_at: DateTime<Utc>,
}

impl CapturedResponse {
    /// Creates a captured response stamped with the current time.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        status: u16,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
            body: body.into(),
            captured_at: Utc::now(),
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the first header value with the given name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Splits into the serializable metadata sidecar and the raw body.
    #[must_use]
    pub fn into_parts(self) -> (ResponseMeta, Bytes) {
        let meta = ResponseMeta {
            url: self.url,
            status: self.status,
            headers: self.headers,
            captured_at: self.captured_at,
            body_len: self.body.len() as u64,
        };
        (meta, self.body)
    }

    /// Reassembles a captured response from its sidecar and body.
    #[must_use]
    pub fn from_parts(meta: ResponseMeta, body: Bytes) -> Self {
        Self {
            url: meta.url,
            status: meta.status,
            headers: meta.headers,
            body,
            captured_at: meta.captured_at,
        }
    }
}

/// Everything about a captured response except its body, stored as a JSON
/// sidecar next to the body file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Normalized URL the response was fetched for.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// When the response was captured.
    pub captured_at: DateTime<Utc>,
    /// Body length in bytes, for integrity checks on read.
    pub body_len: u64,
}
