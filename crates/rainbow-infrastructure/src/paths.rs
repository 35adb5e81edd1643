//! Path management for Rainbow configuration and per-user data.
//!
//! ```text
//! ~/.config/rainbow/
//! └── secret.json              # API keys
//!
//! ~/.local/share/rainbow/      # Data root (overridable)
//! └── users/<user_id>/
//!     ├── persona.toml
//!     ├── subscription.toml
//!     ├── messages.jsonl
//!     ├── gifts.jsonl
//!     └── dreams.jsonl
//! ```

use rainbow_core::RainbowError;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "rainbow";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
    /// A user id that cannot be used as a directory name.
    InvalidUserId(String),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
            PathError::InvalidUserId(id) => write!(f, "Invalid user id: '{}'", id),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for RainbowError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::HomeDirNotFound => RainbowError::config(err.to_string()),
            PathError::InvalidUserId(_) => RainbowError::validation(err.to_string()),
        }
    }
}

/// Platform directories for Rainbow.
pub struct RainbowPaths;

impl RainbowPaths {
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Path to `secret.json`. Keep it readable by the owner only.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}

/// Where each user's files live under a data root.
#[derive(Debug, Clone)]
pub struct UserDataLayout {
    root: PathBuf,
}

impl UserDataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout under the platform data directory.
    pub fn default_location() -> Result<Self, PathError> {
        Ok(Self::new(RainbowPaths::data_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_dir(&self, user_id: &str) -> Result<PathBuf, PathError> {
        Ok(self.root.join("users").join(checked_user_id(user_id)?))
    }

    pub fn persona_file(&self, user_id: &str) -> Result<PathBuf, PathError> {
        Ok(self.user_dir(user_id)?.join("persona.toml"))
    }

    pub fn subscription_file(&self, user_id: &str) -> Result<PathBuf, PathError> {
        Ok(self.user_dir(user_id)?.join("subscription.toml"))
    }

    pub fn messages_file(&self, user_id: &str) -> Result<PathBuf, PathError> {
        Ok(self.user_dir(user_id)?.join("messages.jsonl"))
    }

    pub fn gifts_file(&self, user_id: &str) -> Result<PathBuf, PathError> {
        Ok(self.user_dir(user_id)?.join("gifts.jsonl"))
    }

    pub fn dreams_file(&self, user_id: &str) -> Result<PathBuf, PathError> {
        Ok(self.user_dir(user_id)?.join("dreams.jsonl"))
    }
}

/// User ids become directory names: ASCII letters, digits, `-` and `_` only.
fn checked_user_id(user_id: &str) -> Result<&str, PathError> {
    let valid = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(user_id)
    } else {
        Err(PathError::InvalidUserId(user_id.to_string()))
    }
}
