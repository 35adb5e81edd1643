//! Read-only access to `~/.config/rainbow/secret.json`.

use crate::paths::RainbowPaths;
use rainbow_core::RainbowError;
use rainbow_core::config::SecretConfig;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SecretStorageError {
    #[error("no secret file at {}", .0.display())]
    Missing(PathBuf),
    #[error("cannot read secret file: {0}")]
    Read(#[from] std::io::Error),
    #[error("secret file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("cannot locate the config directory")]
    NoConfigDir,
}

impl From<SecretStorageError> for RainbowError {
    fn from(err: SecretStorageError) -> Self {
        RainbowError::config(err.to_string())
    }
}

/// Loads API keys. Never writes; the file is maintained by hand.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Storage at the default `~/.config/rainbow/secret.json`.
    pub fn new() -> Result<Self, SecretStorageError> {
        RainbowPaths::secret_file()
            .map(|path| Self { path })
            .map_err(|_| SecretStorageError::NoConfigDir)
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SecretStorageError::Missing(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
