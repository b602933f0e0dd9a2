use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while building a request, before it reaches the auth step.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),

    #[error("failed to serialize request body: {0}")]
    Body(#[from] serde_json::Error),
}

/// A request descriptor: method, URL, headers and body.
///
/// `url` is kept exactly as the caller wrote it. Relative paths such as
/// `/movies/42` are resolved against the base URL by the transport, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Parse a method name (case-insensitive) into a request.
    pub fn parse(method: &str, url: impl Into<String>) -> Result<Self, RequestError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| RequestError::InvalidMethod(method.to_string()))?;
        Ok(Self::new(method, url))
    }

    /// Add or replace a header, validating name and value.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), RequestError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RequestError::InvalidHeaderName(name.to_string()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| RequestError::InvalidHeaderValue(name.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    /// Serialize `value` as the JSON body and set `Content-Type`.
    pub fn set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), RequestError> {
        self.body = Some(serde_json::to_vec(value)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
