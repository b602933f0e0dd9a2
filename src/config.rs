//! Client configuration, read once at startup.
//!
//! Environment variables:
//! - `CINEMA_API_URL` - Base URL (default: `http://localhost:3000/api`)
//! - `CINEMA_TOKEN_KEY` - Storage key holding the bearer credential (default: `token`)
//! - `CINEMA_STORE_PATH` - Path of the credential store file (default: platform data dir)

use std::path::PathBuf;

/// Default URL for local development.
pub const DEFAULT_URL: &str = "http://localhost:3000/api";

/// Default storage key for the credential.
pub const DEFAULT_TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prepended to every relative request URL.
    pub base_url: String,
    /// Key looked up in the credential store before each request.
    pub token_key: String,
    /// Credential store file. `None` uses the platform data directory.
    pub store_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            store_path: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = non_empty("CINEMA_API_URL").unwrap_or_else(|| DEFAULT_URL.to_string());
        let token_key =
            non_empty("CINEMA_TOKEN_KEY").unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string());
        let store_path = non_empty("CINEMA_STORE_PATH").map(PathBuf::from);

        Self {
            base_url,
            token_key,
            store_path,
        }
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}
