//! Authenticated HTTP client.
//!
//! Every request goes through two steps, strictly in order:
//! 1. [`BearerAuth::intercept`] reads the credential from storage and, if one
//!    is stored, sets the `Authorization` header.
//! 2. The [`Transport`] sends the request.
//!
//! If step 1 fails the request is never sent and the caller sees the storage
//! error unchanged. Construct one [`ApiClient`] at startup and clone it into
//! every caller; clones share the store and the underlying connection pool.

mod auth;
mod transport;

pub use auth::BearerAuth;
pub use transport::{ReqwestTransport, Transport, TransportError};

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::{ApiResponse, OutboundRequest, RequestError};
use crate::storage::{CredentialStore, FileStore, StorageError};

/// Client errors.
///
/// Request, storage and transport errors are wrapped transparently so the
/// original cause is what callers match on and what gets displayed.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("stored credential is not a valid header value")]
    InvalidCredential,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: credential missing or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// HTTP client that attaches the stored bearer credential to every request.
pub struct ApiClient<S: ?Sized = FileStore, T: ?Sized = ReqwestTransport> {
    auth: BearerAuth<S>,
    transport: Arc<T>,
}

impl<S: ?Sized, T: ?Sized> Clone for ApiClient<S, T> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<S: ?Sized, T: ?Sized> fmt::Debug for ApiClient<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ApiClient<FileStore, ReqwestTransport> {
    /// Wire the file-backed store and the `reqwest` transport from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let store = FileStore::from_config(config)?;
        tracing::debug!(
            base_url = %config.base_url,
            store = %store.path().display(),
            "api client configured"
        );
        Ok(Self::new(
            Arc::new(store),
            &config.token_key,
            Arc::new(ReqwestTransport::new(&config.base_url)),
        ))
    }
}

impl<S, T> ApiClient<S, T>
where
    S: CredentialStore + ?Sized,
    T: Transport + ?Sized,
{
    pub fn new(store: Arc<S>, token_key: impl Into<String>, transport: Arc<T>) -> Self {
        Self {
            auth: BearerAuth::new(store, token_key),
            transport,
        }
    }

    pub fn auth(&self) -> &BearerAuth<S> {
        &self.auth
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start building a request.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_, S, T> {
        RequestBuilder {
            client: self,
            request: Ok(OutboundRequest::new(method, url)),
        }
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_, S, T> {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_, S, T> {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_, S, T> {
        self.request(Method::PUT, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder<'_, S, T> {
        self.request(Method::DELETE, url)
    }

    /// Intercept then transmit. The transport's result is returned untouched,
    /// whatever the status code.
    pub async fn send(&self, request: OutboundRequest) -> Result<ApiResponse, ClientError> {
        let request = self.auth.intercept(request).await?;
        Ok(self.transport.send(request).await?)
    }

    /// Send and decode a JSON response, mapping error statuses to [`ClientError`].
    pub async fn send_json<R: DeserializeOwned>(
        &self,
        request: OutboundRequest,
    ) -> Result<R, ClientError> {
        let response = self.send(request).await?;
        handle_response(response)
    }
}

/// Convert a response into `R`, treating non-2xx statuses as errors.
fn handle_response<R: DeserializeOwned>(response: ApiResponse) -> Result<R, ClientError> {
    if response.is_success() {
        return Ok(response.json()?);
    }

    let body = response.text();
    match response.status {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
        StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        status => Err(ClientError::Server(format!("{}: {}", status, body))),
    }
}

/// Request under construction. The first construction error is kept and
/// returned from [`send`](Self::send) before the auth step runs.
pub struct RequestBuilder<'a, S: ?Sized, T: ?Sized> {
    client: &'a ApiClient<S, T>,
    request: Result<OutboundRequest, RequestError>,
}

impl<S, T> RequestBuilder<'_, S, T>
where
    S: CredentialStore + ?Sized,
    T: Transport + ?Sized,
{
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let Ok(request) = &mut self.request {
            if let Err(e) = request.set_header(name, value) {
                self.request = Err(e);
            }
        }
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        if let Ok(request) = &mut self.request {
            if let Err(e) = request.set_json(body) {
                self.request = Err(e);
            }
        }
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        if let Ok(request) = &mut self.request {
            request.body = Some(body.into());
        }
        self
    }

    pub fn build(self) -> Result<OutboundRequest, RequestError> {
        self.request
    }

    pub async fn send(self) -> Result<ApiResponse, ClientError> {
        let request = self.request?;
        self.client.send(request).await
    }

    pub async fn send_json<R: DeserializeOwned>(self) -> Result<R, ClientError> {
        let request = self.request?;
        self.client.send_json(request).await
    }
}
