//! Network fetch abstraction for precaching and cache-miss passthrough.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::response::CapturedResponse;

/// Abstraction over live network fetches for testability.
///
/// The controller only ever asks for a URL and gets back a captured
/// response; whether a non-success status is acceptable depends on the call
/// site (install rejects it, intercept passes it through).
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    /// Fetches `url` and captures the full response.
    ///
    /// `url` is a normalized match key; site-relative paths are resolved
    /// against the implementation's origin.
    async fn fetch(&self, url: &str) -> Result<CapturedResponse>;
}

/// Default fetcher backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: String,
}

impl HttpFetcher {
    /// Creates a fetcher resolving site-relative URLs against `origin`
    /// (e.g. `https://pixelforge.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(origin: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            origin: origin.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolves a normalized URL to the absolute form used on the wire.
    #[must_use]
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{url}", self.origin)
        }
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<CapturedResponse> {
        let response = self.client.get(self.resolve(url)).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;

        Ok(CapturedResponse::new(url, status, headers, body))
    }
}
