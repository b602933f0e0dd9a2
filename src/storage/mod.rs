//! Persistent key-value storage holding the current credential.
//!
//! The client only ever reads from storage. Writers (`set`/`remove` on the
//! concrete backends) belong to whatever flow logs the user in or out.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Read access to a key-value store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up `key`. `Ok(None)` means nothing is stored, which is not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
}
