use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ApiResponse, OutboundRequest};

/// Connection-level failures. HTTP error statuses are not transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// For `Transport` implementations not backed by `reqwest` (in-process
    /// fakes, alternative HTTP stacks) to report that nothing could be sent.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Sends a fully prepared request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<ApiResponse, TransportError>;
}

/// `reqwest`-backed transport with a fixed base URL.
#[derive(Clone)]
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs bypass the base URL; anything else is appended to it.
    pub fn resolve(&self, url: &str) -> String {
        if is_absolute(url) {
            return url.to_string();
        }
        match (self.base_url.ends_with('/'), url.starts_with('/')) {
            (true, true) => format!("{}{}", self.base_url.trim_end_matches('/'), url),
            (false, false) if !url.is_empty() => format!("{}/{}", self.base_url, url),
            _ => format!("{}{}", self.base_url, url),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<ApiResponse, TransportError> {
        let url = self.resolve(&request.url);
        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        tracing::trace!(%url, %status, bytes = body.len(), "response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
