use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{CredentialStore, StorageError};
use crate::config::ClientConfig;

const STORE_FILE: &str = "storage.json";

/// Distinguishes temp files of concurrent writers within one process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Key-value store persisted as a flat JSON object.
///
/// The file is re-read on every `get`, so values written by another process
/// are picked up by the next request. A missing file holds no values.
///
/// Writes go to a sibling temp file that is then renamed over the store, so a
/// concurrent reader sees either the old contents or the new, never a
/// truncated file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let dirs = directories::ProjectDirs::from("", "", "cinema").ok_or_else(|| {
            StorageError::Unavailable("could not determine data directory".to_string())
        })?;
        Ok(Self::open(dirs.data_dir().join(STORE_FILE)))
    }

    /// `config.store_path` if set, the platform data directory otherwise.
    pub fn from_config(config: &ClientConfig) -> Result<Self, StorageError> {
        match &config.store_path {
            Some(path) => Ok(Self::open(path)),
            None => Self::open_default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }

    /// Remove `key`. Returns whether a value was present.
    pub async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut values = self.load().await?;
        if values.remove(key).is_none() {
            return Ok(false);
        }
        self.save(&values).await?;
        Ok(true)
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(values)?;

        let tmp = self.temp_path();
        if let Err(e) = write_and_replace(&tmp, &self.path, &content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), "storage file written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| STORE_FILE.to_string());
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }
}

async fn write_and_replace(tmp: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(tmp, content).await?;
    tokio::fs::rename(tmp, target).await
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.remove(key))
    }
}
