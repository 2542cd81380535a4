//! Secret stores
//!
//! Supplies the starting credentials and takes the rotated ones back after a
//! refresh. Saving always overwrites the previous value.

use super::types::Credentials;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Durable home of the client credentials
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Load the current credentials
    async fn load(&self) -> Result<Credentials>;

    /// Replace the stored credentials
    async fn save(&self, credentials: &Credentials) -> Result<()>;
}

/// Credentials kept in a YAML file with the four credential keys
///
/// Other keys in the file survive a save.
#[derive(Debug, Clone)]
pub struct YamlSecretStore {
    path: PathBuf,
}

impl YamlSecretStore {
    /// Create a store backed by the given file
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SecretStore for YamlSecretStore {
    async fn load(&self) -> Result<Credentials> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| {
                Error::secret_store(format!(
                    "Failed to read secrets file {}: {e}",
                    self.path.display()
                ))
            })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            Error::secret_store(format!(
                "Failed to parse secrets file {}: {e}",
                self.path.display()
            ))
        })
    }

    async fn save(&self, credentials: &Credentials) -> Result<()> {
        let yaml = serde_yaml::to_string(credentials)?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, yaml).await.map_err(|e| {
            Error::secret_store(format!("Failed to write secrets temp file: {e}"))
        })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::secret_store(format!("Failed to rename secrets file: {e}")))?;

        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

/// In-process store for tests and dry runs
#[derive(Debug, Clone)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<Credentials>>,
    saves: Arc<RwLock<usize>>,
}

impl MemorySecretStore {
    /// Create a store holding the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credentials)),
            saves: Arc::new(RwLock::new(0)),
        }
    }

    /// Snapshot of the stored credentials
    pub async fn current(&self) -> Credentials {
        self.inner.read().await.clone()
    }

    /// How many times `save` has been called
    pub async fn save_count(&self) -> usize {
        *self.saves.read().await
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn load(&self) -> Result<Credentials> {
        Ok(self.current().await)
    }

    async fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.inner.write().await = credentials.clone();
        *self.saves.write().await += 1;
        Ok(())
    }
}
